use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};

use application::service::{
    CreateLendingService, FineService, GetLendingService, ReturnLendingService,
};

use self::request::{
    CreateRequest, LendingPath, PageRequest, ReturnRequest, SearchRequest, Transformer,
};
use self::response::{CreatedPresenter, LendingResponse, LendingsResponse, Presenter};
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;

mod request;
mod response;

pub trait LendingRouter {
    fn route_lending(self) -> Self;
}

impl LendingRouter for Router<AppModule> {
    fn route_lending(self) -> Self {
        self.route(
            "/lendings",
            post(
                |State(module): State<AppModule>, Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, CreatedPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.create_lending(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route("/lendings/search", post(search_lendings))
        .route(
            "/lendings/overdue",
            get(
                |State(module): State<AppModule>, Query(req): Query<PageRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|page| async move { module.overdue_lendings(page).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/lendings/avg-duration",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| async move { module.average_duration().await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/lendings/:year/:sequence",
            get(
                |State(module): State<AppModule>, Path(path): Path<LendingPath>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(path)
                        .handle(|dto| async move { module.get_lending(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .patch(return_lending),
        )
        .route(
            "/lendings/:year/:sequence/fine",
            get(
                |State(module): State<AppModule>, Path(path): Path<LendingPath>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(path)
                        .handle(|dto| async move { module.compute_fine(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}

async fn return_lending(
    State(module): State<AppModule>,
    Path(path): Path<LendingPath>,
    headers: HeaderMap,
    Json(req): Json<ReturnRequest>,
) -> Result<LendingResponse, ErrorStatus> {
    Ok(Controller::new(Transformer, Presenter)
        .try_intake((path, headers, req))?
        .handle(|dto| async move { module.return_lending(dto).await })
        .await?)
}

async fn search_lendings(
    State(module): State<AppModule>,
    Query(page): Query<PageRequest>,
    Json(req): Json<SearchRequest>,
) -> Result<LendingsResponse, ErrorStatus> {
    Ok(Controller::new(Transformer, Presenter)
        .try_intake((req, page))?
        .handle(|(dto, page)| async move { module.search_lendings(dto, page).await })
        .await?)
}
