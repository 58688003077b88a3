// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 房源页面解析的公共工具
//!
//! `scraper::Html` 不是 `Send`，所有解析都在同步函数中完成，
//! 异步的抓取策略只在拿到页面文本后调用这里的函数。

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// 第一个匹配元素的文本（去除首尾空白），为空视为未命中
pub fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// 第一个匹配元素的属性值，为空视为未命中
pub fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// 元素内所有文本拼接后的结果
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 整个页面 body 的文本
pub fn page_text(doc: &Html) -> String {
    match Selector::parse("body") {
        Ok(selector) => doc
            .select(&selector)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// 所有 `<script>` 标签的原始内容
pub fn script_contents(doc: &Html) -> Vec<String> {
    match Selector::parse("script") {
        Ok(selector) => doc
            .select(&selector)
            .map(|el| el.inner_html())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// `<meta property=...>` 或 `<meta name=...>` 的 content
pub fn meta_content(doc: &Html, key: &str) -> Option<String> {
    first_attr(doc, &format!("meta[property='{}']", key), "content")
        .or_else(|| first_attr(doc, &format!("meta[name='{}']", key), "content"))
}

/// 从 JSON-LD 中识别出的房源信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JsonLdListing {
    pub name: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
}

/// 在 `application/ld+json` 块中查找带有 `name` 或 `aggregateRating` 的对象
pub fn json_ld_listing(doc: &Html) -> Option<JsonLdListing> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    for script in doc.select(&selector) {
        let Ok(value) = serde_json::from_str::<Value>(&script.inner_html()) else {
            continue;
        };
        if let Some(listing) = find_listing_node(&value) {
            return Some(listing);
        }
    }
    None
}

fn find_listing_node(value: &Value) -> Option<JsonLdListing> {
    match value {
        Value::Array(items) => items.iter().find_map(find_listing_node),
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                if let Some(found) = find_listing_node(graph) {
                    return Some(found);
                }
            }
            let rating = map.get("aggregateRating");
            if !map.contains_key("name") && rating.is_none() {
                return None;
            }
            Some(JsonLdListing {
                name: map.get("name").and_then(Value::as_str).map(str::to_string),
                image: map.get("image").and_then(image_url),
                rating: rating.and_then(|r| r.get("ratingValue")).and_then(number_f64),
                review_count: rating
                    .and_then(|r| r.get("reviewCount").or_else(|| r.get("ratingCount")))
                    .and_then(number_f64)
                    .map(|n| n as i32),
            })
        }
        _ => None,
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// JSON 数字或数字字符串
fn number_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 去掉除数字和小数点以外的字符后解析为浮点数
pub fn digits_f64(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// 去掉非数字字符后解析为整数
pub fn digits_i32(text: &str) -> Option<i32> {
    let cleaned: String = text.chars().filter(char::is_ascii_digit).collect();
    cleaned.parse().ok()
}
