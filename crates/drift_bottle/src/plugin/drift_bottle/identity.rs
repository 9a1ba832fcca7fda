use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use onebot::{
    adapter::Caller,
    schema::{
        GetGroupInfoParams, GetGroupInfoResult, GetStrangerInfoParams, GetStrangerInfoResult, ResponseBody,
    },
};
use serde::{Serialize, de::DeserializeOwned};

use crate::utils::HTTP_CLIENT;

/// 根据 id 查询用户与群的显示名称
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn user_name(&self, user_id: u64) -> Result<String>;
    async fn group_name(&self, group_id: u64) -> Result<String>;
}

fn user_display_name(info: GetStrangerInfoResult) -> Result<String> {
    info.display_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| anyhow!("user {} has no nickname", info.user_id))
}

fn group_display_name(info: GetGroupInfoResult) -> Result<String> {
    if info.group_name.is_empty() {
        return Err(anyhow!("group {} has no name", info.group_id));
    }
    Ok(info.group_name)
}

/// 复用机器人自身的 OneBot 连接
pub struct CallerLookup {
    caller: Arc<dyn Caller>,
}

impl CallerLookup {
    pub fn new(caller: Arc<dyn Caller>) -> Self {
        Self { caller }
    }
}

#[async_trait]
impl IdentityLookup for CallerLookup {
    async fn user_name(&self, user_id: u64) -> Result<String> {
        let info = self
            .caller
            .get_stranger_info(GetStrangerInfoParams {
                user_id,
                no_cache: false,
            })
            .await?;
        user_display_name(info)
    }

    async fn group_name(&self, group_id: u64) -> Result<String> {
        let info = self
            .caller
            .get_group_info(GetGroupInfoParams {
                group_id,
                no_cache: false,
            })
            .await?;
        group_display_name(info)
    }
}

/// 通过单独的 OneBot HTTP 接口查询，例如 `http://napcat:3000`
pub struct HttpLookup {
    endpoint: String,
}

impl HttpLookup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
        }
    }

    async fn post<P: Serialize + Sync, T: DeserializeOwned>(&self, action: &str, params: &P) -> Result<T> {
        let response = HTTP_CLIENT
            .post(format!("{}/{}", self.endpoint, action))
            .json(params)
            .send()
            .await?
            .error_for_status()?
            .json::<ResponseBody>()
            .await?;
        Ok(response.into_data()?)
    }
}

#[async_trait]
impl IdentityLookup for HttpLookup {
    async fn user_name(&self, user_id: u64) -> Result<String> {
        let info = self
            .post(
                "get_stranger_info",
                &GetStrangerInfoParams {
                    user_id,
                    no_cache: false,
                },
            )
            .await?;
        user_display_name(info)
    }

    async fn group_name(&self, group_id: u64) -> Result<String> {
        let info = self
            .post(
                "get_group_info",
                &GetGroupInfoParams {
                    group_id,
                    no_cache: false,
                },
            )
            .await?;
        group_display_name(info)
    }
}
