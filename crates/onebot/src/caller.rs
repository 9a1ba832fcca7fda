//! 各接口的通用调用逻辑，不同的适配器只需要实现 [`Caller::call`]
use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::{adapter::Caller, schema::*};

async fn request<T: DeserializeOwned>(connector: &dyn Caller, params: RequestParams) -> Result<T> {
    let response = connector.call(ApiRequest::new(params)).await?;
    Ok(response.body.into_data()?)
}

pub async fn send_msg(connector: &dyn Caller, param: SendMsgParams) -> Result<SendMsgResult> {
    request(connector, RequestParams::SendMsg(param)).await
}

pub async fn get_stranger_info(connector: &dyn Caller, param: GetStrangerInfoParams) -> Result<GetStrangerInfoResult> {
    request(connector, RequestParams::GetStrangerInfo(param)).await
}

pub async fn get_group_info(connector: &dyn Caller, param: GetGroupInfoParams) -> Result<GetGroupInfoResult> {
    request(connector, RequestParams::GetGroupInfo(param)).await
}
