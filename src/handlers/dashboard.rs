use warp::{Filter, Rejection, Reply};

use crate::auth::role::FRONT_DESK;
use crate::auth::Claims;
use crate::handlers::filters::{reject, with_role, with_state};
use crate::reporting::DashboardStats;
use crate::state::AppState;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("dashboard")
        .and(warp::get())
        .and(with_role(state.clone(), FRONT_DESK))
        .and(with_state(state))
        .and_then(dashboard)
}

async fn dashboard(_claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let stats = DashboardStats::collect(state.store.as_ref())
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&stats))
}
