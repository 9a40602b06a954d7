//! Command handlers for the order board.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use geoplan_db::models::Order;

use super::command::{BoardCommand, BoardOutcome, DropLocation, Navigation, Notice};
use super::list;
use super::state::{BoardState, ListStatus};
use crate::erp::ErpAdapter;
use crate::error::PlanningError;
use crate::geocode::Geocoder;
use crate::plan::PlanService;
use crate::store::OrderStore;

/// Runs board commands against the plan service, the order store, the ERP
/// adapter, and the geocoder.
///
/// The controller holds no board state of its own: every handler takes the
/// current [`BoardState`] by reference and returns the next one inside a
/// [`BoardOutcome`].
#[derive(Clone)]
pub struct BoardController {
    plans: PlanService,
    orders: Arc<dyn OrderStore>,
    erp: Arc<dyn ErpAdapter>,
    geocoder: Arc<dyn Geocoder>,
}

impl BoardController {
    pub fn new(
        plans: PlanService,
        orders: Arc<dyn OrderStore>,
        erp: Arc<dyn ErpAdapter>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            plans,
            orders,
            erp,
            geocoder,
        }
    }

    /// Open the board for a plan id given as text (a route parameter or a
    /// CLI argument).
    pub async fn open(&self, plan_id: &str) -> Result<BoardState, PlanningError> {
        let id = Uuid::parse_str(plan_id.trim())
            .map_err(|_| PlanningError::InvalidPlanId(plan_id.to_owned()))?;
        self.open_plan(id).await
    }

    /// Load the plan's orders and delivery date into a fresh board.
    pub async fn open_plan(&self, plan_id: Uuid) -> Result<BoardState, PlanningError> {
        let plan = self.plans.get_by_id(plan_id).await?;
        let orders = self.orders.find_by_plan_id(plan_id).await?;
        info!(%plan_id, delivery_date = %plan.delivery_date, orders = orders.len(), "board opened");
        Ok(BoardState::loaded(plan.id, plan.delivery_date, orders))
    }

    /// Apply one command to `state`.
    ///
    /// On error nothing changes: `state` is still the current state.
    pub async fn execute(
        &self,
        state: &BoardState,
        command: BoardCommand,
    ) -> Result<BoardOutcome, PlanningError> {
        debug!(plan_id = %state.plan_id, command = command.name(), "board command");
        match command {
            BoardCommand::AddOrder { name, address } => Ok(add_order(state, name, address)),
            BoardCommand::FetchFromErp => self.fetch_from_erp(state).await,
            BoardCommand::DragStart { order_id } => drag_start(state, order_id),
            BoardCommand::Drop {
                target_id,
                location,
            } => drop_on(state, target_id, location),
            BoardCommand::DragEnd => Ok(drag_end(state)),
            BoardCommand::MoveOrder {
                order_id,
                target_id,
                location,
            } => {
                let started = drag_start(state, order_id)?;
                let dropped = drop_on(&started.state, target_id, location)?;
                Ok(drag_end(&dropped.state))
            }
            BoardCommand::GeocodeAll => self.geocode_all(state).await,
            BoardCommand::Save => self.save(state).await,
            BoardCommand::Print => Ok(BoardOutcome::state(state.clone()).with_navigation(
                Navigation::Print {
                    plan_id: state.plan_id,
                },
            )),
        }
    }

    async fn fetch_from_erp(&self, state: &BoardState) -> Result<BoardOutcome, PlanningError> {
        let candidates = self
            .erp
            .fetch_orders_by_delivery_date(state.delivery_date)
            .await?;
        let fetched = candidates.len();
        let added = list::new_orders(&state.orders, candidates, state.plan_id);

        if added.is_empty() {
            debug!(plan_id = %state.plan_id, fetched, "fetch_from_erp: no new orders");
            return Ok(BoardOutcome::state(state.clone()).with_notice(Notice::info("No new orders")));
        }

        debug!(plan_id = %state.plan_id, fetched, added = added.len(), "fetch_from_erp: new orders");
        let count = added.len();
        let mut next = state.clone();
        next.orders.extend(added);
        next.mark_dirty();
        Ok(BoardOutcome::state(next)
            .with_notice(Notice::success(format!("{count} new orders fetched"))))
    }

    async fn geocode_all(&self, state: &BoardState) -> Result<BoardOutcome, PlanningError> {
        let mut next = state.clone();
        let mut candidates = 0usize;
        let mut resolved = 0usize;
        let mut changed = false;

        for order in &state.orders {
            let Some(address) = order.geocodable_address() else {
                continue;
            };
            candidates += 1;
            match self.geocoder.geocode(address).await? {
                Some(point) => {
                    resolved += 1;
                    changed |= list::set_point(&mut next.orders, order.id, point);
                }
                None => debug!(order_id = %order.id, address, "geocode miss"),
            }
        }

        if changed {
            next.mark_dirty();
        }
        debug!(plan_id = %state.plan_id, candidates, resolved, "geocode_all");
        Ok(BoardOutcome::state(next).with_notice(Notice::info(format!(
            "{resolved} of {candidates} addresses geocoded"
        ))))
    }

    async fn save(&self, state: &BoardState) -> Result<BoardOutcome, PlanningError> {
        let mut canonical = self.orders.save(state.plan_id, &state.orders).await?;
        canonical.sort_by_key(|o| o.number);
        info!(plan_id = %state.plan_id, orders = canonical.len(), "board saved");

        let dragged = state
            .dragged
            .filter(|id| canonical.iter().any(|o| o.id == *id));
        Ok(BoardOutcome::state(BoardState {
            plan_id: state.plan_id,
            delivery_date: state.delivery_date,
            orders: canonical,
            status: ListStatus::Saved,
            dragged,
        }))
    }
}

fn add_order(state: &BoardState, name: String, address: Option<String>) -> BoardOutcome {
    let address = address.filter(|a| !a.trim().is_empty());
    let order = Order::new(name, address, state.plan_id);
    debug!(plan_id = %state.plan_id, order_id = %order.id, "add_order");

    let mut next = state.clone();
    next.orders.push(order);
    next.mark_dirty();
    BoardOutcome::state(next)
}

fn drag_start(state: &BoardState, order_id: Uuid) -> Result<BoardOutcome, PlanningError> {
    if !state.contains(order_id) {
        return Err(PlanningError::OrderNotOnBoard(order_id));
    }
    let mut next = state.clone();
    next.dragged = Some(order_id);
    Ok(BoardOutcome::state(next))
}

fn drop_on(
    state: &BoardState,
    target_id: Uuid,
    location: DropLocation,
) -> Result<BoardOutcome, PlanningError> {
    let Some(dragged) = state.dragged else {
        return Ok(BoardOutcome::state(state.clone()));
    };
    let mut next = state.clone();
    if list::move_order(&mut next.orders, dragged, target_id, location)? {
        next.mark_dirty();
    }
    Ok(BoardOutcome::state(next))
}

fn drag_end(state: &BoardState) -> BoardOutcome {
    let mut next = state.clone();
    next.dragged = None;
    BoardOutcome::state(next)
}
