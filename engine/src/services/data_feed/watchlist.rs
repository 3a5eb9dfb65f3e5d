// Handlers for the AddItem, DeleteLabel and GetLabels RPCs
use std::sync::Arc;

use tokio::sync::Mutex;
use tonic::{Response, Status};

use crate::data::history::HistoryLoader;
use crate::data::watchlist::WatchlistFile;
use crate::services::{Empty, LabelList, LabelRequest};

pub async fn handle_add_item(
    req_payload: LabelRequest,
    watchlist: Arc<Mutex<WatchlistFile>>,
) -> Result<Response<Empty>, Status> {
    let watchlist = watchlist.lock().await;
    watchlist.add(&req_payload.label).await?;
    Ok(Response::new(Empty {}))
}

pub async fn handle_delete_label(
    req_payload: LabelRequest,
    watchlist: Arc<Mutex<WatchlistFile>>,
    history: Arc<HistoryLoader>,
) -> Result<Response<Empty>, Status> {
    let watchlist = watchlist.lock().await;
    watchlist.delete(&req_payload.label).await?;
    history.forget_locks(&req_payload.label).await;
    Ok(Response::new(Empty {}))
}

pub async fn handle_get_labels(watchlist: Arc<Mutex<WatchlistFile>>) -> Result<Response<LabelList>, Status> {
    let watchlist = watchlist.lock().await;
    let labels = watchlist.load().await?;
    Ok(Response::new(LabelList { labels }))
}
