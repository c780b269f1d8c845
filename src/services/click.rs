//! 点击参数解析
//!
//! 把入站请求的 query 参数解析成 [`ClickDescriptor`]：
//! - `redirect_url`：必填，二次 percent-decode 后去掉 `https://` 之前的任意前缀
//! - `customerId` / `enterpriseId` / `data_point_name` / `data_point_value`：可选，原样透传
//!
//! query string 不按 `application/x-www-form-urlencoded` 解析：`+` 不会变成空格。

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::warn;

use crate::errors::{ClickTagError, Result};

pub const PARAM_REDIRECT_URL: &str = "redirect_url";
pub const PARAM_CUSTOMER_ID: &str = "customerId";
pub const PARAM_ENTERPRISE_ID: &str = "enterpriseId";
pub const PARAM_LABEL_NAME: &str = "data_point_name";
pub const PARAM_LABEL_VALUE: &str = "data_point_value";

/// 对外暴露的缺参错误信息（400 响应体）
pub const MISSING_REDIRECT_URL: &str = "redirect_url is required";

const HTTPS_SCHEME: &str = "https://";

/// 一次点击的完整描述，每个请求构造一次，之后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDescriptor {
    pub target_url: String,
    pub enterprise_id: Option<String>,
    pub customer_id: Option<String>,
    pub label_name: Option<String>,
    pub label_value: Option<String>,
}

impl ClickDescriptor {
    /// 从 query 参数构造
    ///
    /// 空字符串等同于缺省。`redirect_url` 缺省时返回 `MissingParameter`。
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self> {
        let raw_url = non_empty(params, PARAM_REDIRECT_URL)
            .ok_or_else(|| ClickTagError::missing_parameter(MISSING_REDIRECT_URL))?;

        let decoded = decode_target(&raw_url);
        let target_url = strip_tracking_prefix(&decoded).to_string();

        Ok(Self {
            target_url,
            enterprise_id: non_empty(params, PARAM_ENTERPRISE_ID),
            customer_id: non_empty(params, PARAM_CUSTOMER_ID),
            label_name: non_empty(params, PARAM_LABEL_NAME),
            label_value: non_empty(params, PARAM_LABEL_VALUE),
        })
    }

    /// 从原始 query string 构造，见 [`parse_query`]
    pub fn from_query_string(query: &str) -> Result<Self> {
        Self::from_query(&parse_query(query))
    }

    /// enterprise id 与 customer id 同时存在时返回二者
    pub fn identity(&self) -> Option<(&str, &str)> {
        match (&self.enterprise_id, &self.customer_id) {
            (Some(enterprise_id), Some(customer_id)) => Some((enterprise_id, customer_id)),
            _ => None,
        }
    }
}

fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

/// 解析原始 query string
///
/// 只做 percent-decode，`+` 保持原样而不是按表单编码变成空格。同名参数以最后一个为准。
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// percent-decode；非法 UTF-8 时退回原值
pub fn decode_target(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("redirect_url is not valid percent-encoded UTF-8, using raw value: {}", e);
            Cow::Borrowed(raw)
        }
    }
}

/// 去掉第一个 `https://` 之前的内容（重复编码或追踪前缀）
///
/// 不含 `https://` 的值原样返回。
pub fn strip_tracking_prefix(url: &str) -> &str {
    match url.find(HTTPS_SCHEME) {
        Some(pos) => &url[pos..],
        None => url,
    }
}
