use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use http::Uri;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    time,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use crate::{
    adapter::{Adapter, Caller, Connector, extract_match_unions},
    caller,
    chain::{Context, MatchUnion},
    error::ConnectError,
    plugin::Plugin,
    schema::*,
};

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct WsAdapter {
    ws_stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    pending: Arc<DashMap<u64, oneshot::Sender<ApiResponse>>>,
    request_tx: Option<mpsc::Sender<ApiRequest>>,
}

impl WsAdapter {
    pub async fn connect(address: &str) -> Result<Box<Self>> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(Uri::from_str(address)?).await?;
        info!(address, "Connected to OneBot server");
        Ok(Box::new(WsAdapter {
            ws_stream: Some(ws_stream),
            pending: Arc::new(DashMap::new()),
            request_tx: None,
        }))
    }
}

/// 按照优先级顺序匹配并处理事件，处理函数返回 true 时中断后续处理
async fn dispatch(context: Context, match_unions: Arc<Vec<Arc<MatchUnion>>>) {
    for match_union in match_unions.iter() {
        if match_union.run(context.clone()).await {
            break;
        }
    }
}

#[async_trait]
impl Connector for WsAdapter {
    async fn spawn(mut self: Box<Self>, plugins: Vec<Plugin>) -> Result<()> {
        let ws_stream = self.ws_stream.take().ok_or(ConnectError::StreamTaken)?;
        let (request_tx, mut request_rx) = mpsc::channel::<ApiRequest>(32);
        self.request_tx = Some(request_tx);
        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        // 发送任务：从请求通道中接收请求，写入 websocket
        let (sender_res_tx, sender_res_rx) = oneshot::channel::<Result<()>>();
        tokio::spawn(async move {
            let res = async {
                while let Some(request) = request_rx.recv().await {
                    ws_sink.send(Message::text(serde_json::to_string(&request)?)).await?;
                }
                Ok::<_, anyhow::Error>(())
            }
            .await;
            let _ = sender_res_tx.send(res);
        });

        // 接收任务：响应按 echo 交还给调用方，事件各自 spawn 处理
        let pending = self.pending.clone();
        let caller = Arc::new(*self);
        let match_unions = Arc::new(extract_match_unions(&plugins));
        let plugins = Arc::new(plugins);
        let (receiver_res_tx, receiver_res_rx) = oneshot::channel::<Result<()>>();
        tokio::spawn(async move {
            let res = async {
                while let Some(msg) = ws_stream.next().await {
                    let text = match msg? {
                        Message::Text(text) => text,
                        Message::Close(frame) => {
                            error!("Connection closed: {frame:?}");
                            break;
                        }
                        _ => continue,
                    };
                    if let Ok(response) = serde_json::from_str::<ApiResponse>(&text) {
                        match pending.remove(&response.echo()) {
                            Some((_, tx)) => {
                                if let Err(response) = tx.send(response) {
                                    error!("Failed to deliver response: {response:?}");
                                }
                            }
                            None => warn!("Received response with unknown echo: {text}"),
                        }
                    } else if let Ok(event) = serde_json::from_str::<Event>(&text) {
                        debug!("Receive event: {event:?}");
                        let context = Context {
                            caller: caller.clone(),
                            event: Arc::new(event),
                            plugins: plugins.clone(),
                        };
                        tokio::spawn(dispatch(context, match_unions.clone()));
                    } else {
                        warn!("Receive unknown message: {text}");
                    }
                }
                Ok::<_, anyhow::Error>(())
            }
            .await;
            let _ = receiver_res_tx.send(res);
        });

        tokio::select! {
            res = sender_res_rx => {
                let res = res?;
                error!("Send request task exited: {res:?}");
                res
            },
            res = receiver_res_rx => {
                let res = res?;
                error!("Receive message task exited: {res:?}");
                res
            },
        }
    }
}

#[async_trait]
impl Caller for WsAdapter {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request_tx = self.request_tx.as_ref().ok_or(ConnectError::NotStarted)?;
        let echo = request.echo();
        let (tx, rx) = oneshot::channel::<ApiResponse>();
        self.pending.insert(echo, tx);
        let res: Result<ApiResponse> = async {
            request_tx.send(request).await?;
            match time::timeout(CALL_TIMEOUT, rx).await {
                Ok(response) => Ok::<_, anyhow::Error>(response?),
                Err(_) => Err(ConnectError::Timeout { echo }.into()),
            }
        }
        .await;
        // 无论成功与否都移除记录，避免超时的请求残留
        self.pending.remove(&echo);
        res
    }

    async fn send_msg(&self, param: SendMsgParams) -> Result<SendMsgResult> {
        caller::send_msg(self, param).await
    }

    async fn get_stranger_info(&self, param: GetStrangerInfoParams) -> Result<GetStrangerInfoResult> {
        caller::get_stranger_info(self, param).await
    }

    async fn get_group_info(&self, param: GetGroupInfoParams) -> Result<GetGroupInfoResult> {
        caller::get_group_info(self, param).await
    }
}

#[async_trait]
impl Adapter for WsAdapter {}
