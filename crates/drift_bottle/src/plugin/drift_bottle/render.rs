use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use crate::{
    config::TemplateConfig,
    plugin::drift_bottle::service::{Outcome, PickFailure, ThrowFailure},
};

const PLACEHOLDERS: [&str; 5] = ["{content}", "{sender_name}", "{sender_id}", "{group_name}", "{group_id}"];

static AHO_CORASICK: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(PLACEHOLDERS).expect("invalid placeholder patterns"));

/// 按照模板将处理结果转换为回复文本
pub struct Renderer {
    templates: TemplateConfig,
}

impl Renderer {
    pub fn new(templates: TemplateConfig) -> Self {
        Self { templates }
    }

    pub fn render(&self, outcome: &Outcome) -> String {
        let t = &self.templates;
        match outcome {
            Outcome::ThrowSuccess { content } => fill(&t.throw_success, [Some(content.clone()), None, None, None, None]),
            Outcome::ThrowFail(ThrowFailure::EmptyContent) => fill(&t.empty_content, Default::default()),
            Outcome::ThrowFail(ThrowFailure::NotInGroup) | Outcome::PickFail(PickFailure::NotInGroup) => {
                fill(&t.not_in_group, Default::default())
            }
            Outcome::PickSuccess {
                content,
                sender_name,
                sender_id,
                group_name,
                group_id,
            } => fill(
                &t.pick_success,
                [
                    Some(content.clone()),
                    Some(sender_name.clone()),
                    Some(sender_id.to_string()),
                    Some(group_name.clone()),
                    Some(group_id.to_string()),
                ],
            ),
            Outcome::PickFail(PickFailure::Empty) => fill(&t.pick_empty, Default::default()),
            Outcome::PickFail(PickFailure::UserInfoUnavailable) => fill(&t.user_info_unavailable, Default::default()),
        }
    }
}

/// 没有对应取值的占位符原样保留
fn fill(template: &str, values: [Option<String>; 5]) -> String {
    let mut rendered = String::with_capacity(template.len());
    AHO_CORASICK.replace_all_with(template, &mut rendered, |mat, placeholder, dst| {
        match &values[mat.pattern().as_usize()] {
            Some(value) => dst.push_str(value),
            None => dst.push_str(placeholder),
        }
        true
    });
    rendered
}
