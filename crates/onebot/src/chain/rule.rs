use std::{borrow::Cow, ops};

use crate::{chain::Matcher, schema::Event};

pub enum InnerRule {
    OnEventStatic(&'static (dyn Fn(&Event) -> bool + Send + Sync)),
    /// 参数为未经裁剪的纯文本消息
    OnText(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

pub struct Rule {
    pub(crate) name: Cow<'static, str>,
    pub(crate) inner: InnerRule,
}

impl Rule {
    pub fn on_message() -> Rule {
        Self {
            name: "on_message".into(),
            inner: InnerRule::OnEventStatic(&|event: &Event| -> bool { event.is_message() }),
        }
    }

    pub fn on_text(name: impl Into<Cow<'static, str>>, is_valid: impl Fn(&str) -> bool + Send + Sync + 'static) -> Rule {
        Self {
            name: name.into(),
            inner: InnerRule::OnText(Box::new(is_valid)),
        }
    }

    pub fn on_exact_match(str: &'static str) -> Rule {
        Self::on_text(str, move |text| text.trim() == str.trim())
    }
}

impl ops::BitAnd<Rule> for Rule {
    type Output = Matcher;

    fn bitand(self, rhs: Rule) -> Matcher {
        Matcher {
            condition: vec![self, rhs],
        }
    }
}
