use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Result;

use crate::{
    adapter::Caller,
    plugin::Plugin,
    schema::{Event, MessageContent, SendMsgParams, SendMsgResult},
};

#[derive(Clone)]
pub struct Context {
    pub caller: Arc<dyn Caller>,
    pub event: Arc<Event>,
    pub plugins: Arc<Vec<Plugin>>,
}

impl Context {
    /// 引用触发事件的消息，回复一段纯文本；群聊回复到群，私聊回复给发送者
    pub async fn reply(&self, text: impl Into<String>) -> Result<SendMsgResult> {
        self.caller
            .send_msg(SendMsgParams {
                message_type: None,
                user_id: self.event.try_user_id().ok(),
                group_id: self.event.try_group_id().ok(),
                message: MessageContent::reply_text(self.event.try_message_id()?, text),
                auto_escape: true,
            })
            .await
    }
}

pub type Handler = Box<dyn Fn(Context) -> Pin<Box<dyn Future<Output = Result<bool>> + Send>> + Send + Sync>;
