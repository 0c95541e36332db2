//! Loaded page views and template rendering.
//!
//! A view is the `<template>` block of a single-file page module (or the
//! whole file when it has none). Rendering fills in route placeholders:
//!
//! - `{{ route.name }}`, `{{ route.path }}`
//! - `{{ meta.KEY }}` for route meta values
//! - `{{ params.KEY }}` for captured path params
//!
//! Any other `{{ ... }}` expression belongs to the client framework and is
//! left untouched.

use serde_json::Value;

use crate::routing::{Params, RouteMeta};

/// Per-navigation values available to a page template.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub route_name: Option<&'a str>,
    pub path: &'a str,
    pub meta: &'a RouteMeta,
    pub params: &'a Params,
}

/// A page module, parsed once and rendered per navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    module: String,
    template: String,
}

impl PageView {
    pub fn parse(module: &str, text: &str) -> Self {
        Self {
            module: module.to_string(),
            template: extract_template(text).trim().to_string(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the template for one navigation.
    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let end = start + 2 + len + 2;
            let key = rest[start + 2..end - 2].trim();

            out.push_str(&rest[..start]);
            match lookup(ctx, key) {
                Some(value) => out.push_str(&escape_html(&value)),
                None => out.push_str(&rest[start..end]),
            }
            rest = &rest[end..];
        }

        out.push_str(rest);
        out
    }
}

fn lookup(ctx: &RenderContext<'_>, key: &str) -> Option<String> {
    match key {
        "route.name" => Some(ctx.route_name.unwrap_or_default().to_string()),
        "route.path" => Some(ctx.path.to_string()),
        _ => {
            if let Some(name) = key.strip_prefix("meta.") {
                Some(ctx.meta.get(name).map(value_text).unwrap_or_default())
            } else {
                key.strip_prefix("params.")
                    .map(|name| ctx.params.get(name).cloned().unwrap_or_default())
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn extract_template(text: &str) -> &str {
    let Some(open) = text.find("<template") else {
        return text;
    };
    let Some(body_start) = text[open..].find('>').map(|i| open + i + 1) else {
        return text;
    };
    match text.rfind("</template>") {
        Some(close) if close >= body_start => &text[body_start..close],
        _ => text,
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
