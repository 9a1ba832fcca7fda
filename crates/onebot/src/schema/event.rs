use std::borrow::Cow;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::schema::{MessageContent, MessageSegment};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Sender {
    pub user_id: Option<u64>,
    pub nickname: Option<String>,
    /// 群名片，私聊时不存在
    pub card: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PrivateMessage {
    pub time: i64,
    pub self_id: u64,
    pub post_type: String,
    pub message_type: String,
    pub sub_type: String,
    pub message_id: i32,
    pub user_id: u64,
    pub message: MessageContent,
    pub raw_message: String,
    pub sender: Sender,
}

#[derive(Deserialize, Debug)]
pub struct GroupMessage {
    pub time: i64,
    pub self_id: u64,
    pub post_type: String,
    pub message_type: String,
    pub sub_type: String,
    pub message_id: i32,
    pub group_id: u64,
    pub user_id: u64,
    pub message: MessageContent,
    pub raw_message: String,
    pub sender: Sender,
}

#[derive(Deserialize, Debug)]
pub struct LifeCycle {
    pub time: i64,
    pub self_id: u64,
    pub post_type: String,
    pub meta_event_type: String,
    pub sub_type: String,
}

#[derive(Deserialize, Debug)]
pub struct HeartBeat {
    pub time: i64,
    pub self_id: u64,
    pub post_type: String,
    pub meta_event_type: String,
    pub status: serde_json::Value,
    pub interval: i64,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Event {
    GroupMessage(GroupMessage),
    PrivateMessage(PrivateMessage),
    LifeCycle(LifeCycle),
    HeartBeat(HeartBeat),
}

impl Event {
    pub fn is_message(&self) -> bool {
        matches!(self, Self::GroupMessage(_) | Self::PrivateMessage(_))
    }

    pub fn sender(&self) -> Option<&Sender> {
        match self {
            Self::GroupMessage(GroupMessage { sender, .. }) | Self::PrivateMessage(PrivateMessage { sender, .. }) => {
                Some(sender)
            }
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&MessageContent> {
        match self {
            Self::GroupMessage(GroupMessage { message, .. })
            | Self::PrivateMessage(PrivateMessage { message, .. }) => Some(message),
            _ => None,
        }
    }

    pub fn try_user_id(&self) -> Result<u64> {
        match self {
            Self::GroupMessage(GroupMessage { user_id, .. })
            | Self::PrivateMessage(PrivateMessage { user_id, .. }) => Ok(*user_id),
            _ => bail!("Event::try_user_id() called on non-message event"),
        }
    }

    /// 只有群消息才有群号，私聊返回错误
    pub fn try_group_id(&self) -> Result<u64> {
        match self {
            Self::GroupMessage(GroupMessage { group_id, .. }) => Ok(*group_id),
            _ => bail!("Event::try_group_id() called on non-group event"),
        }
    }

    pub fn try_message_id(&self) -> Result<i32> {
        match self {
            Self::GroupMessage(GroupMessage { message_id, .. })
            | Self::PrivateMessage(PrivateMessage { message_id, .. }) => Ok(*message_id),
            _ => bail!("Event::try_message_id() called on non-message event"),
        }
    }

    /// 优先使用群名片，其次是昵称
    pub fn display_name(&self) -> String {
        self.sender()
            .and_then(|sender| {
                sender
                    .card
                    .as_deref()
                    .filter(|card| !card.is_empty())
                    .or(sender.nickname.as_deref())
            })
            .unwrap_or_default()
            .to_owned()
    }

    /// 不带有 CQ 码的纯文本消息，非消息事件返回空字符串
    pub fn plain_text(&self) -> Cow<'_, str> {
        match self.message() {
            None => Cow::Borrowed(""),
            Some(MessageContent::Text(text)) => Cow::Borrowed(text),
            Some(MessageContent::Segment(segments)) => segments
                .iter()
                .filter_map(|seg| match seg {
                    MessageSegment::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<String>()
                .into(),
        }
    }
}
