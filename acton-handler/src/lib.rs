//! # acton-handler
//!
//! Service-layer pipeline for axum request handlers: run business logic under
//! one transactional contract, turn the outcome into a uniform envelope, render
//! it as JSON or a flashing redirect, and shape listing queries consistently.
//!
//! ## Features
//!
//! - **Action executor**: guarded execution with injected transactions, fault
//!   recovery into [`ActionResult`](executor::ActionResult) and a global guard switch
//! - **Response builder**: appending messages and errors, `success`/`failed`
//!   shorthands, JSON or `303` redirect rendering
//! - **Flash state** (feature `session`): redirect envelopes persisted through
//!   `tower-sessions` and consumed on the next request
//! - **Query shaping**: keyword search, safe ordering, date ranges and capped
//!   pagination over any [`DataSource`](query::DataSource)
//! - **Configuration**: figment with TOML files, XDG paths and `ACTON_` env overrides
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_handler::prelude::*;
//! use axum::{extract::State, routing::get, Router};
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct App {
//!     config: Arc<Config>,
//!     posts: MemoryDataSource,
//!     executor: ActionExecutor,
//! }
//!
//! async fn list_posts(State(app): State<App>, params: RequestParams) -> Result<Dispatch> {
//!     let shaper = QueryShaper::new(&app.posts, &app.config.pagination);
//!     let result = app
//!         .executor
//!         .action(|| Ok(shaper.fetch(QuerySpec::entity("posts"), &params)?))
//!         .without_transaction()
//!         .run()?;
//!
//!     Ok(ResponseBuilder::new().from_result(result, ResultMapping::new()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = App {
//!         executor: ActionExecutor::untransacted(config.executor.clone()),
//!         config: Arc::new(config),
//!         posts: MemoryDataSource::new(),
//!     };
//!
//!     let router = Router::new().route("/posts", get(list_posts)).with_state(app);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod observability;
pub mod query;
pub mod responder;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ExecutorConfig, PaginationConfig, ServiceConfig};
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::observability::init_tracing;

    pub use crate::executor::{
        Action, ActionExecutor, ActionResult, ActionState, ExecutionError, FaultSink,
        NoTransaction, TracingFaultSink, TransactionError, TransactionScope,
    };

    pub use crate::query::{
        DataSource, Fetched, FilterGroup, FilterOperator, MemoryDataSource, Page, PaginationMeta,
        Projection, QueryError, QueryErrorKind, QueryHandle, QueryShaper, QuerySource, QuerySpec,
        RequestParams, SearchColumn, SortDirection,
    };

    pub use crate::responder::{
        Dispatch, JsonReply, RedirectReply, Reply, ResponseBuilder, ResponseEnvelope,
        ResponseKind, ResultMapping,
    };

    #[cfg(feature = "session")]
    pub use crate::responder::{persist_flash, FlashedReply};

    pub use axum::{
        extract::State,
        response::IntoResponse,
        routing::{delete, get, post, put},
        Json, Router,
    };
}
