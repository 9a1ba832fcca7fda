use std::{fmt::Display, ops};

use crate::{
    chain::{Rule, rule::InnerRule},
    schema::Event,
};

pub struct Matcher {
    pub condition: Vec<Rule>,
}

impl Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.condition.iter().map(|rule| rule.name.as_ref()).collect::<Vec<_>>();
        write!(f, "{}", names.join(" & "))
    }
}

impl Matcher {
    /// 所有条件依次检查，任一不满足即短路返回
    pub fn is_match(&self, event: &Event) -> bool {
        self.condition.iter().all(|rule| match &rule.inner {
            InnerRule::OnEventStatic(is_valid) => is_valid(event),
            InnerRule::OnText(is_valid) => is_valid(&event.plain_text()),
        })
    }
}

impl ops::BitAnd<Rule> for Matcher {
    type Output = Self;

    fn bitand(mut self, rhs: Rule) -> Self::Output {
        self.condition.push(rhs);
        self
    }
}

impl From<Rule> for Matcher {
    fn from(rule: Rule) -> Self {
        Self { condition: vec![rule] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_message(text: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "time": 1700000000, "self_id": 10000, "post_type": "message", "message_type": "group",
            "sub_type": "normal", "message_id": 1, "group_id": 1919810, "user_id": 114514,
            "message": text, "raw_message": text, "sender": {"user_id": 114514, "nickname": "Alice"}
        }))
        .unwrap()
    }

    #[test]
    fn test_matcher() {
        let help = Rule::on_message() & Rule::on_exact_match("#help");
        assert_eq!(help.to_string(), "on_message & #help");
        assert!(help.is_match(&group_message(" #help ")));
        assert!(!help.is_match(&group_message("#help me")));

        let keep_spaces = Matcher::from(Rule::on_text("ends_with_space", |text| text.ends_with(' ')))
            & Rule::on_message();
        assert!(keep_spaces.is_match(&group_message("扔漂流瓶 ")));
        assert!(!keep_spaces.is_match(&group_message("扔漂流瓶")));

        let heartbeat: Event = serde_json::from_value(serde_json::json!({
            "time": 1700000000, "self_id": 10000, "post_type": "meta_event",
            "meta_event_type": "heartbeat", "status": {}, "interval": 30000
        }))
        .unwrap();
        assert!(!help.is_match(&heartbeat));
    }
}
