use std::sync::Arc;

use anyhow::Result;
use derive_more::Display;

use crate::{
    model::bottle::{BottleDraft, Picker},
    plugin::drift_bottle::identity::IdentityLookup,
    store::BottleStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRef {
    pub id: u64,
    pub name: String,
}

/// 一次命令调用的上下文，`group` 为 `None` 表示不在群聊中
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub user: UserRef,
    pub group: Option<GroupRef>,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ThrowFailure {
    #[display("empty_content")]
    EmptyContent,
    #[display("not_in_group")]
    NotInGroup,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PickFailure {
    #[display("empty")]
    Empty,
    #[display("not_in_group")]
    NotInGroup,
    #[display("user_info_unavailable")]
    UserInfoUnavailable,
}

/// 命令的处理结果，由 [`Renderer`](super::render::Renderer) 转换为回复文本
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ThrowSuccess {
        content: String,
    },
    ThrowFail(ThrowFailure),
    PickSuccess {
        content: String,
        sender_name: String,
        sender_id: u64,
        group_name: String,
        group_id: u64,
    },
    PickFail(PickFailure),
}

/// 日志中只展示内容的前 20 个字符
fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head = chars.by_ref().take(20).collect::<String>();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

/// 扔漂流瓶与捡漂流瓶的业务逻辑，本身不保存任何状态
///
/// 存储错误通过 `Err` 返回，其余情况都是 [`Outcome`]。
#[derive(Clone)]
pub struct BottleService {
    store: Arc<BottleStore>,
    lookup: Arc<dyn IdentityLookup>,
}

impl BottleService {
    pub fn new(store: Arc<BottleStore>, lookup: Arc<dyn IdentityLookup>) -> Self {
        Self { store, lookup }
    }

    pub async fn throw(&self, invocation: &Invocation, content: String) -> Result<Outcome> {
        let Some(group) = &invocation.group else {
            debug!(user_id = invocation.user.id, "Throw rejected: {}", ThrowFailure::NotInGroup);
            return Ok(Outcome::ThrowFail(ThrowFailure::NotInGroup));
        };
        if content.trim().is_empty() {
            debug!(user_id = invocation.user.id, "Throw rejected: {}", ThrowFailure::EmptyContent);
            return Ok(Outcome::ThrowFail(ThrowFailure::EmptyContent));
        }
        let draft = BottleDraft {
            content: content.clone(),
            sender_id: invocation.user.id,
            sender_name: invocation.user.name.clone(),
            sender_group_id: group.id,
            sender_group_name: group.name.clone(),
        };
        let store = self.store.clone();
        let (bottle_id, drifting) = tokio::task::spawn_blocking(move || -> Result<_> {
            let bottle_id = store.insert(draft)?;
            Ok((bottle_id, store.unclaimed_count()?))
        })
        .await??;
        info!(
            bottle_id,
            drifting,
            "用户 {}({}) 在群 {}({}) 扔了一个漂流瓶: {}",
            invocation.user.name,
            invocation.user.id,
            group.name,
            group.id,
            preview(&content)
        );
        Ok(Outcome::ThrowSuccess { content })
    }

    /// 捡起的漂流瓶在查询发送者信息失败时不会放回海里
    pub async fn pick(&self, invocation: &Invocation) -> Result<Outcome> {
        let Some(group) = &invocation.group else {
            debug!(user_id = invocation.user.id, "Pick rejected: {}", PickFailure::NotInGroup);
            return Ok(Outcome::PickFail(PickFailure::NotInGroup));
        };
        let picker = Picker {
            user_id: invocation.user.id,
            group_id: group.id,
        };
        let store = self.store.clone();
        let (claimed, drifting) = tokio::task::spawn_blocking(move || -> Result<_> {
            let claimed = store.claim_random(picker)?;
            Ok((claimed, store.unclaimed_count()?))
        })
        .await??;
        let Some(bottle) = claimed else {
            debug!(user_id = invocation.user.id, "Pick rejected: {}", PickFailure::Empty);
            return Ok(Outcome::PickFail(PickFailure::Empty));
        };
        info!(
            bottle_id = bottle.id,
            drifting,
            "用户 {}({}) 在群 {}({}) 捡到了漂流瓶",
            invocation.user.name,
            invocation.user.id,
            group.name,
            group.id
        );
        let names = futures::future::try_join(
            self.lookup.user_name(bottle.sender_id),
            self.lookup.group_name(bottle.sender_group_id),
        )
        .await;
        match names {
            Ok((sender_name, group_name)) => Ok(Outcome::PickSuccess {
                content: bottle.content,
                sender_name,
                sender_id: bottle.sender_id,
                group_name,
                group_id: bottle.sender_group_id,
            }),
            Err(e) => {
                warn!(bottle_id = bottle.id, "Failed to resolve bottle sender: {e:?}");
                Ok(Outcome::PickFail(PickFailure::UserInfoUnavailable))
            }
        }
    }
}
