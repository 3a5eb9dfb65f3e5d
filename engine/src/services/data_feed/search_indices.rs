// Handler for the SearchIndices RPC
use std::sync::Arc;

use tonic::{Response, Status};

use crate::data::history::HistoryLoader;
use crate::services::{SearchRequest, SearchResponse};

pub async fn handle_search_indices(
    req_payload: SearchRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<SearchResponse>, Status> {
    let query = req_payload.query.trim();
    if query.is_empty() {
        return Ok(Response::new(SearchResponse { symbols: Vec::new() }));
    }
    let symbols = history.source().search(query).await?;
    Ok(Response::new(SearchResponse { symbols }))
}
