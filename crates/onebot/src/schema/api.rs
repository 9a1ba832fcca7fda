use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{error::ApiError, schema::message::MessageContent};

/// 发送消息的参数
#[derive(Debug, Serialize)]
pub struct SendMsgParams {
    /// 消息类型，支持 private、group，分别对应私聊、群组，如不传入，则根据传入的 *_id 参数判断
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// 对方 QQ 号（消息类型为 private 时需要）
    pub user_id: Option<u64>,
    /// 群号（消息类型为 group 时需要）
    pub group_id: Option<u64>,
    /// 要发送的内容
    pub message: MessageContent,
    /// 消息内容是否作为纯文本发送（即不解析 CQ 码），只在 message 字段是字符串时有效
    pub auto_escape: bool,
}

/// 发送消息的公共响应数据
#[derive(Debug, Deserialize)]
pub struct SendMsgResult {
    pub message_id: i32,
}

/// 获取陌生人信息的参数，不要求与机器人在同一群组
#[derive(Debug, Serialize)]
pub struct GetStrangerInfoParams {
    pub user_id: u64,
    pub no_cache: bool,
}

/// 获取陌生人信息的响应数据
#[derive(Debug, Deserialize)]
pub struct GetStrangerInfoResult {
    pub user_id: u64,
    #[serde(default)]
    pub nickname: String,
    /// 部分实现（如 napcat）会额外返回 nick 字段
    #[serde(default)]
    pub nick: Option<String>,
}

impl GetStrangerInfoResult {
    /// 昵称为空时退回 nick
    pub fn display_name(&self) -> Option<&str> {
        Some(self.nickname.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| self.nick.as_deref().filter(|name| !name.is_empty()))
    }
}

/// 获取群信息的参数
#[derive(Debug, Serialize)]
pub struct GetGroupInfoParams {
    pub group_id: u64,
    pub no_cache: bool,
}

/// 获取群信息的响应数据
#[derive(Debug, Deserialize)]
pub struct GetGroupInfoResult {
    pub group_id: u64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub member_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "params")]
pub enum RequestParams {
    SendMsg(SendMsgParams),
    GetStrangerInfo(GetStrangerInfoParams),
    GetGroupInfo(GetGroupInfoParams),
}

#[derive(Debug, Serialize)]
pub struct ApiRequest {
    echo: u64,
    #[serde(flatten)]
    params: RequestParams,
}

impl ApiRequest {
    pub fn new(params: RequestParams) -> Self {
        Self {
            // 生成的 u64 过长时，接口返回的 echo 可能丢失精度，因此减小一些
            echo: rand::random::<u64>() >> 16,
            params,
        }
    }

    pub fn echo(&self) -> u64 {
        self.echo
    }
}

/// 接口响应的公共部分，WebSocket 与 HTTP 调用共用
#[derive(Debug, Deserialize)]
pub struct ResponseBody {
    pub status: String,
    pub retcode: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub wording: Option<String>,
}

impl ResponseBody {
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if self.status != "ok" {
            return Err(ApiError::Failed {
                retcode: self.retcode,
                message: self.wording.or(self.message).unwrap_or_default(),
            });
        }
        if self.data.is_null() {
            return Err(ApiError::EmptyData);
        }
        Ok(serde_json::from_value(self.data)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    echo: u64,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn echo(&self) -> u64 {
        self.echo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_serialize() {
        let request = ApiRequest::new(RequestParams::GetStrangerInfo(GetStrangerInfoParams {
            user_id: 114514,
            no_cache: false,
        }));
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            format!(
                r#"{{"echo":{},"action":"get_stranger_info","params":{{"user_id":114514,"no_cache":false}}}}"#,
                request.echo()
            )
        );
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"status":"ok","retcode":0,"data":{"user_id":114514,"nickname":"","nick":"Alice"},"echo":12}"#,
        )
        .unwrap();
        assert_eq!(response.echo(), 12);
        let info: GetStrangerInfoResult = response.body.into_data().unwrap();
        assert_eq!(info.display_name(), Some("Alice"));

        let response: ApiResponse =
            serde_json::from_str(r#"{"status":"failed","retcode":1404,"data":null,"wording":"群不存在","echo":13}"#)
                .unwrap();
        assert!(matches!(
            response.body.into_data::<GetGroupInfoResult>(),
            Err(ApiError::Failed { retcode: 1404, .. })
        ));

        let response: ApiResponse = serde_json::from_str(r#"{"status":"ok","retcode":0,"data":null,"echo":14}"#).unwrap();
        assert!(matches!(
            response.body.into_data::<GetGroupInfoResult>(),
            Err(ApiError::EmptyData)
        ));
    }
}
