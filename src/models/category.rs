use phf::phf_map;

/// 服装类别枚举
///
/// 类别集合是封闭的，衣橱目录按这些类别分组展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// 上衣
    Tops,
    /// 下装
    Bottoms,
    /// 外套
    Outerwear,
    /// 鞋类
    Footwear,
    /// 连衣裙
    Dresses,
    /// 睡衣
    Sleepwear,
    /// 内衣
    Undergarments,
    /// 配饰
    Accessories,
    /// 单独抠图得到的条目
    Extracted,
    /// 整套拆解得到的条目
    Itemized,
    /// 其他
    Other,
}

/// 类别别名表（英文标准名 + 常见中文写法）
static CATEGORY_ALIASES: phf::Map<&'static str, Category> = phf_map! {
    "tops" => Category::Tops,
    "top" => Category::Tops,
    "上衣" => Category::Tops,
    "bottoms" => Category::Bottoms,
    "bottom" => Category::Bottoms,
    "下装" => Category::Bottoms,
    "裤子" => Category::Bottoms,
    "outerwear" => Category::Outerwear,
    "外套" => Category::Outerwear,
    "footwear" => Category::Footwear,
    "shoes" => Category::Footwear,
    "鞋" => Category::Footwear,
    "dresses" => Category::Dresses,
    "dress" => Category::Dresses,
    "连衣裙" => Category::Dresses,
    "sleepwear" => Category::Sleepwear,
    "睡衣" => Category::Sleepwear,
    "undergarments" => Category::Undergarments,
    "内衣" => Category::Undergarments,
    "accessories" => Category::Accessories,
    "accessory" => Category::Accessories,
    "配饰" => Category::Accessories,
    "extracted" => Category::Extracted,
    "itemized" => Category::Itemized,
    "other" => Category::Other,
    "其他" => Category::Other,
};

impl Category {
    /// 获取存入衣橱目录时使用的标准名称
    pub fn slug(self) -> &'static str {
        match self {
            Category::Tops => "tops",
            Category::Bottoms => "bottoms",
            Category::Outerwear => "outerwear",
            Category::Footwear => "footwear",
            Category::Dresses => "dresses",
            Category::Sleepwear => "sleepwear",
            Category::Undergarments => "undergarments",
            Category::Accessories => "accessories",
            Category::Extracted => "extracted",
            Category::Itemized => "itemized",
            Category::Other => "other",
        }
    }

    /// 从字符串解析类别（精确匹配别名表）
    pub fn parse(s: &str) -> Option<Self> {
        CATEGORY_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }

    /// 解析类别，认不出来时归入 Other
    pub fn parse_or_other(s: &str) -> Self {
        Self::parse(s).unwrap_or(Category::Other)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}
