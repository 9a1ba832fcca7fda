use serde::{Deserialize, Deserializer, Serialize};

/// 消息段
///
/// 接收时遇到未列出的类型（或字段与预期不符）会解析为 [`MessageSegment::Unknown`]，
/// 不影响同一条消息中其余消息段的解析。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum MessageSegment {
    /// 纯文本内容
    Text { text: String },
    /// QQ 表情
    Face { id: String },
    /// 图片，接收时 napcat 会附带 url 等字段
    Image {
        file: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        url: Option<String>,
    },
    /// 语音
    Record {
        file: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        url: Option<String>,
    },
    /// 短视频
    Video {
        file: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        url: Option<String>,
    },
    /// @某人，`all` 表示全体成员
    At { qq: String },
    /// 猜拳魔法表情，接收时带有结果
    Rps {
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        result: Option<String>,
    },
    /// 掷骰子魔法表情，接收时带有点数
    Dice {
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        result: Option<String>,
    },
    /// 戳一戳
    Poke { r#type: String, id: String },
    /// 链接分享
    Share {
        url: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        image: Option<String>,
    },
    /// 推荐好友或群，`type` 为 qq 或 group
    Contact { r#type: String, id: String },
    /// 位置
    Location {
        lat: String,
        lon: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        title: Option<String>,
    },
    /// 音乐分享，`type` 为 qq、163 等
    Music { r#type: String, id: String },
    /// 回复，引用的消息 ID
    Reply { id: String },
    /// 合并转发，仅接收
    Forward { id: String },
    /// XML 卡片消息
    Xml { data: String },
    /// JSON 卡片消息
    Json { data: String },
    /// 无法识别的消息段，保留原始的类型与数据，仅接收
    #[serde(skip)]
    Unknown { r#type: String, data: serde_json::Value },
}

impl MessageSegment {
    fn from_value(mut value: serde_json::Value) -> Self {
        if let Ok(segment) = MessageSegment::deserialize(&value) {
            return segment;
        }
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        debug!(kind = %kind, "Unrecognized message segment");
        Self::Unknown {
            r#type: kind,
            data: value.get_mut("data").map(serde_json::Value::take).unwrap_or_default(),
        }
    }
}

fn lenient_segments<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<MessageSegment>, D::Error> {
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values.into_iter().map(MessageSegment::from_value).collect())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    #[serde(deserialize_with = "lenient_segments")]
    Segment(Vec<MessageSegment>),
}

impl MessageContent {
    /// 回复某条消息的纯文本内容
    pub fn reply_text(message_id: i32, text: impl Into<String>) -> Self {
        Self::Segment(vec![
            MessageSegment::Reply {
                id: message_id.to_string(),
            },
            MessageSegment::Text { text: text.into() },
        ])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_deserialize() {
        let content: MessageContent = serde_json::from_str(
            r#"[{"type":"reply","data":{"id":"42"}},{"type":"text","data":{"text":"捡漂流瓶"}}]"#,
        )
        .unwrap();
        assert_eq!(content, MessageContent::reply_text(42, "捡漂流瓶"));
        let content: MessageContent = serde_json::from_str(r#""扔漂流瓶hello""#).unwrap();
        assert_eq!(content, MessageContent::Text("扔漂流瓶hello".to_owned()));
    }

    #[test]
    fn test_unrecognized_segments() {
        let content: MessageContent = serde_json::from_value(json!([
            {"type": "text", "data": {"text": "扔漂流瓶hi"}},
            {"type": "mface", "data": {"emoji_id": "abc", "summary": "[贴纸]"}},
            {"type": "dice", "data": {"result": "3"}},
            {"type": "file", "data": {"file": "a.txt", "file_size": "12"}},
            {"type": "face", "data": {"id": 14}},
        ]))
        .unwrap();
        let MessageContent::Segment(segments) = content else {
            panic!("expected segments");
        };
        assert_eq!(segments.len(), 5);
        assert_eq!(
            segments[0],
            MessageSegment::Text {
                text: "扔漂流瓶hi".to_owned()
            }
        );
        assert_eq!(
            segments[1],
            MessageSegment::Unknown {
                r#type: "mface".to_owned(),
                data: json!({"emoji_id": "abc", "summary": "[贴纸]"}),
            }
        );
        assert_eq!(
            segments[2],
            MessageSegment::Dice {
                result: Some("3".to_owned())
            }
        );
        assert!(matches!(&segments[3], MessageSegment::Unknown { r#type, .. } if r#type == "file"));
        // 字段类型不符的已知类型同样降级
        assert!(matches!(&segments[4], MessageSegment::Unknown { r#type, .. } if r#type == "face"));
    }
}
