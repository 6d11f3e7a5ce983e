//! 请求构建服务 - 业务能力层
//!
//! 把选择集合快照 + 标量参数组装成有序的 multipart 请求。
//! 部件顺序 == 选择顺序，下游对顺序有语义依赖
//! （例如试穿请求的第一张图必须是人物），任何时候都不能重排

use crate::error::BuildError;
use crate::models::asset::Asset;
use anyhow::Result;
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// 出站请求的一个部件
#[derive(Debug, Clone)]
pub enum FormPart {
    /// 文件部件（素材内容）
    File {
        field: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    /// 标量参数部件
    Text { field: String, value: String },
}

/// 组装完成的出站请求
///
/// 先落成可检查的部件列表，转成 reqwest 的 Form 时逐个追加，
/// 顺序不变
#[derive(Debug, Clone, Default)]
pub struct OutboundRequest {
    parts: Vec<FormPart>,
}

impl OutboundRequest {
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// 文件部件数量
    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, FormPart::File { .. }))
            .count()
    }

    /// 转换为 reqwest 的 multipart 表单
    pub fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for part in self.parts {
            match part {
                FormPart::Text { field, value } => {
                    form = form.text(field, value);
                }
                FormPart::File {
                    field,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form = form.part(field, part);
                }
            }
        }
        Ok(form)
    }
}

/// 请求构建服务
pub struct RequestBuilder;

impl RequestBuilder {
    /// 创建新的请求构建服务
    pub fn new() -> Self {
        Self
    }

    /// 组装出站请求
    ///
    /// # 参数
    /// - `file_field`: 文件部件的字段名（如 `image` / `images`）
    /// - `snapshot`: 选择集合快照，无内容的素材会被跳过
    /// - `params`: 标量参数，按给定顺序追加在文件部件之后
    ///
    /// # 返回
    /// 过滤后一个文件部件都不剩时返回 `EmptyPayload`，
    /// 调用方必须不发出该请求
    pub fn build(
        &self,
        file_field: &str,
        snapshot: &[Asset],
        params: &[(String, String)],
    ) -> Result<OutboundRequest, BuildError> {
        let mut parts = Vec::new();

        for asset in snapshot {
            match &asset.payload {
                Some(payload) => parts.push(FormPart::File {
                    field: file_field.to_string(),
                    file_name: payload.file_name.clone(),
                    content_type: payload.content_type.clone(),
                    bytes: payload.bytes.clone(),
                }),
                None => {
                    debug!("跳过无内容素材: {}", asset.display_name);
                }
            }
        }

        if parts.is_empty() {
            return Err(BuildError::EmptyPayload);
        }

        for (field, value) in params {
            parts.push(FormPart::Text {
                field: field.clone(),
                value: value.clone(),
            });
        }

        Ok(OutboundRequest { parts })
    }

    /// 组装试穿请求：人物在前，服装按选择顺序跟在后面
    ///
    /// 服装列表过滤后为空时返回 `EmptyPayload`
    /// （只有人物照没有服装，不构成一次有效试穿）
    pub fn build_composite(
        &self,
        subject: &Asset,
        items: &[Asset],
    ) -> Result<OutboundRequest, BuildError> {
        // 先单独校验服装部分，人物照不能顶替服装
        self.build("images", items, &[])?;

        let mut ordered = Vec::with_capacity(items.len() + 1);
        ordered.push(subject.clone());
        ordered.extend_from_slice(items);
        self.build("images", &ordered, &[])
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{Asset, RemoteMeta};

    fn local(seq: u64, name: &str) -> Asset {
        Asset::local(seq, format!("{}.png", name), vec![seq as u8], "image/png")
    }

    fn metadata_only(seq: u64, id: &str) -> Asset {
        Asset::remote(
            seq,
            RemoteMeta {
                id: id.to_string(),
                name: id.to_string(),
                category: "tops".to_string(),
                primary_color: None,
            },
            None,
        )
    }

    fn file_names(request: &OutboundRequest) -> Vec<String> {
        request
            .parts()
            .iter()
            .filter_map(|p| match p {
                FormPart::File { file_name, .. } => Some(file_name.clone()),
                FormPart::Text { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_part_order_follows_snapshot_order() {
        let builder = RequestBuilder::new();
        let snapshot = vec![local(1, "a"), local(2, "b"), local(3, "c")];

        let request = builder.build("images", &snapshot, &[]).unwrap();
        assert_eq!(file_names(&request), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_assets_without_payload_are_skipped() {
        let builder = RequestBuilder::new();
        let snapshot = vec![local(1, "a"), metadata_only(2, "ghost"), local(3, "c")];

        let request = builder.build("images", &snapshot, &[]).unwrap();
        assert_eq!(request.file_count(), 2);
        assert_eq!(file_names(&request), vec!["a.png", "c.png"]);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let builder = RequestBuilder::new();

        let err = builder.build("image", &[], &[]).unwrap_err();
        assert_eq!(err, BuildError::EmptyPayload);

        // 全是占位素材也一样
        let snapshot = vec![metadata_only(1, "g1"), metadata_only(2, "g2")];
        let err = builder.build("image", &snapshot, &[]).unwrap_err();
        assert_eq!(err, BuildError::EmptyPayload);
    }

    #[test]
    fn test_params_follow_file_parts() {
        let builder = RequestBuilder::new();
        let params = vec![("clothing_items".to_string(), "[\"red shirt\"]".to_string())];

        let request = builder.build("image", &[local(1, "a")], &params).unwrap();
        assert_eq!(request.parts().len(), 2);
        assert!(matches!(
            &request.parts()[1],
            FormPart::Text { field, .. } if field == "clothing_items"
        ));
    }

    #[test]
    fn test_composite_puts_subject_first() {
        let builder = RequestBuilder::new();
        let subject = local(99, "person");
        let items = vec![local(1, "shirt"), local(2, "pants")];

        let request = builder.build_composite(&subject, &items).unwrap();
        assert_eq!(
            file_names(&request),
            vec!["person.png", "shirt.png", "pants.png"]
        );
    }

    #[test]
    fn test_composite_requires_at_least_one_item() {
        let builder = RequestBuilder::new();
        let subject = local(1, "person");

        let err = builder.build_composite(&subject, &[]).unwrap_err();
        assert_eq!(err, BuildError::EmptyPayload);
    }
}
