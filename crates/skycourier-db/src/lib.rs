//! database layer for skycourier.
//!
//! this crate provides persistent storage for:
//! - Users
//! - Orders
//! - Drones
//!
//! it also hosts the reservation selection query that decides which order a
//! drone is offered next.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;
use std::time::Duration;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database as SeaOrmDatabase,
    DatabaseConnection, DbBackend, EntityTrait, Order as SortOrder, QueryFilter, QueryOrder,
    QuerySelect, Set, Statement, TransactionTrait,
    sea_query::Expr,
};
use sea_orm_migration::MigratorTrait;

use skycourier_types::{
    Config, Coordinates, Drone, DroneId, DroneStatus, Order, OrderId, OrderStatus, Role, User,
    UserId,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// default page size for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// hard upper bound on page size for listings.
pub const MAX_PAGE_SIZE: u64 = 100;

/// deadline for point reads and writes.
const POINT_OP_DEADLINE: Duration = Duration::from_secs(3);

/// deadline for listing queries.
const LIST_OP_DEADLINE: Duration = Duration::from_secs(5);

/// clamp a requested page size into `[1, MAX_PAGE_SIZE]`, defaulting zero.
pub fn clamp_page_size(size: u64) -> u64 {
    if size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        size.min(MAX_PAGE_SIZE)
    }
}

/// filters and pagination for the admin order listing.
#[derive(Debug, Clone, Default)]
pub struct ListOrdersAdminParams {
    /// restrict to these statuses; empty means all.
    pub statuses: Vec<OrderStatus>,
    /// restrict to orders submitted by this user.
    pub submitted_by: Option<UserId>,
    /// inclusive lower bound on placement_at.
    pub placement_from: Option<String>,
    /// inclusive upper bound on placement_at.
    pub placement_to: Option<String>,
    /// page size; zero means default.
    pub page_size: u64,
    /// keyset cursor: placement unix seconds.
    pub after_seconds: i64,
    /// keyset cursor: order id.
    pub after_id: i64,
}

/// filters and pagination for the admin drone listing.
#[derive(Debug, Clone, Default)]
pub struct ListDronesAdminParams {
    /// restrict to this status.
    pub status: Option<DroneStatus>,
    /// only drones with an assignment.
    pub assigned_only: bool,
    /// only drones without an assignment.
    pub unassigned_only: bool,
    /// case-sensitive substring on name or serial number.
    pub name_or_serial_contains: Option<String>,
    /// page size; zero means default.
    pub page_size: u64,
    /// keyset cursor: drone id.
    pub after_id: i64,
}

/// database trait for skycourier storage operations.
///
/// this abstracts the embedded store so the dispatch engine and the handlers
/// can be tested against an in-memory database.
pub trait Database: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── User Operations ─────────────────────────────────────────────────────

    /// create a new user with the default role. returns the created user.
    fn create_user(&self, username: &str) -> impl Future<Output = Result<User>> + Send;

    /// get a user by id.
    fn get_user(&self, id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// get a user by username (case-sensitive).
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// list users ordered by id.
    fn list_users(
        &self,
        limit: u64,
        offset: u64,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    /// set the role for the given username. errors with not-found when the
    /// username does not exist.
    fn update_role_by_username(
        &self,
        username: &str,
        role: Role,
    ) -> impl Future<Output = Result<()>> + Send;

    /// delete a user. the user's orders are cascade-deleted.
    fn delete_user(&self, id: UserId) -> impl Future<Output = Result<()>> + Send;

    // ─── Order Operations ────────────────────────────────────────────────────

    /// insert a new order. status defaults to placed when unspecified and
    /// placement_at is generated by the database and read back.
    fn create_order(&self, order: &Order) -> impl Future<Output = Result<Order>> + Send;

    /// get an order by id.
    fn get_order(&self, id: OrderId) -> impl Future<Output = Result<Option<Order>>> + Send;

    /// set the status of an order.
    fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// set the handoff pickup location of an order.
    fn update_pickup_location(
        &self,
        id: OrderId,
        pickup: Coordinates,
    ) -> impl Future<Output = Result<()>> + Send;

    /// update both origin and destination of an order. errors with not-found
    /// when no row changed.
    fn update_order_locations(
        &self,
        id: OrderId,
        origin: Coordinates,
        destination: Coordinates,
    ) -> impl Future<Output = Result<()>> + Send;

    /// atomically append a drone id to the order's drone_path.
    fn append_drone_path(
        &self,
        order_id: OrderId,
        drone_id: DroneId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// whether the drone id already appears in the order's drone_path.
    fn is_drone_in_path(
        &self,
        order_id: OrderId,
        drone_id: DroneId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// the selection policy: the next order the given drone may reserve.
    ///
    /// filters out orders currently assigned to any drone, orders outside
    /// `{to_pick_up, placed}`, and orders whose drone_path already contains
    /// the drone. handoffs win over fresh orders, then oldest placement,
    /// then lowest id.
    fn find_next_available_for_reservation(
        &self,
        drone_id: DroneId,
    ) -> impl Future<Output = Result<Option<Order>>> + Send;

    /// the order currently assigned to the given drone, if any.
    fn get_assigned_order_for_drone(
        &self,
        drone_id: DroneId,
    ) -> impl Future<Output = Result<Option<Order>>> + Send;

    /// delete an order.
    fn delete_order(&self, id: OrderId) -> impl Future<Output = Result<()>> + Send;

    /// page of a user's orders, newest first, keyset `(placement, id)`.
    fn list_orders_for_user_page(
        &self,
        user_id: UserId,
        page_size: u64,
        after_seconds: i64,
        after_id: i64,
    ) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// admin order listing with filters, newest first, keyset paginated.
    fn list_orders_admin(
        &self,
        params: ListOrdersAdminParams,
    ) -> impl Future<Output = Result<Vec<Order>>> + Send;

    // ─── Drone Operations ────────────────────────────────────────────────────

    /// insert a new drone. status defaults to fixed when unspecified.
    fn create_drone(&self, drone: &Drone) -> impl Future<Output = Result<Drone>> + Send;

    /// get a drone by id.
    fn get_drone(&self, id: DroneId) -> impl Future<Output = Result<Option<Drone>>> + Send;

    /// get a drone by serial number.
    fn get_drone_by_serial(
        &self,
        serial: &str,
    ) -> impl Future<Output = Result<Option<Drone>>> + Send;

    /// get a drone by display name. names are not unique; the first match by
    /// id wins.
    fn get_drone_by_name(&self, name: &str)
    -> impl Future<Output = Result<Option<Drone>>> + Send;

    /// get the drone holding the given order, if any.
    fn get_drone_by_assigned_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Option<Drone>>> + Send;

    /// record a heartbeat: location and speed.
    fn update_drone_location_and_speed(
        &self,
        id: DroneId,
        location: Coordinates,
        speed_mph: f64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// set the status of a drone.
    fn update_drone_status(
        &self,
        id: DroneId,
        status: DroneStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// write `assigned_job = order_id` on the drone row. fails with
    /// [`Error::AlreadyExists`] when another drone already holds the order;
    /// this is the race-loser path of concurrent reservations.
    fn assign_job(
        &self,
        drone_id: DroneId,
        order_id: OrderId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// clear the drone's assignment.
    fn unassign_job(&self, drone_id: DroneId) -> impl Future<Output = Result<()>> + Send;

    /// assign the order to the drone and append the drone to the order's
    /// path in a single transaction.
    fn reserve_with_path(
        &self,
        drone_id: DroneId,
        order_id: OrderId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// delete a drone.
    fn delete_drone(&self, id: DroneId) -> impl Future<Output = Result<()>> + Send;

    /// admin drone listing with filters, ascending id, keyset paginated.
    fn list_drones_admin(
        &self,
        params: ListDronesAdminParams,
    ) -> impl Future<Output = Result<Vec<Drone>>> + Send;
}

/// the main database implementation using sea-orm over sqlite.
#[derive(Clone)]
pub struct SkycourierDb {
    conn: DatabaseConnection,
}

impl SkycourierDb {
    /// open (or create) the database file from config and run migrations.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database.path);
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.apply_pragmas().await;
        db.migrate().await?;
        Ok(db)
    }

    /// build a sea-orm compatible connection url from a file path.
    fn build_connection_url(path: &str) -> String {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{}", path)
        };
        // ?mode=rwc creates the file if it doesn't exist
        if url.contains('?') {
            url
        } else {
            format!("{}?mode=rwc", url)
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// apply recommended sqlite settings. journal_mode is persistent in the
    /// database file; busy_timeout guards against writer contention.
    /// in-memory databases reject WAL, which is fine to ignore.
    async fn apply_pragmas(&self) {
        let _ = self.conn.execute_unprepared("PRAGMA journal_mode=WAL").await;
        let _ = self
            .conn
            .execute_unprepared("PRAGMA busy_timeout=5000")
            .await;
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }
}

/// run a store future under the given deadline.
async fn with_deadline<T>(
    deadline: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| Error::Database("deadline exceeded".to_string()))?
}

/// write `assigned_job = order_id` on the drone row.
async fn assign_job_on<C: ConnectionTrait>(
    conn: &C,
    drone_id: DroneId,
    order_id: OrderId,
) -> Result<()> {
    entity::drone::Entity::update_many()
        .col_expr(
            entity::drone::Column::AssignedJob,
            Expr::value(Some(order_id.0)),
        )
        .filter(entity::drone::Column::Id.eq(drone_id.0))
        .exec(conn)
        .await?;
    Ok(())
}

/// append a drone id to the order's comma-separated path in one statement.
async fn append_drone_path_on<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
    drone_id: DroneId,
) -> Result<()> {
    let id_str = drone_id.0.to_string();
    entity::order::Entity::update_many()
        .col_expr(
            entity::order::Column::DronePath,
            Expr::cust_with_values(
                "CASE WHEN drone_path IS NULL OR drone_path = '' THEN ? ELSE drone_path || ',' || ? END",
                [id_str.clone(), id_str],
            ),
        )
        .filter(entity::order::Column::Id.eq(order_id.0))
        .exec(conn)
        .await?;
    Ok(())
}

/// keyset condition for order listings: strictly older than the cursor row.
fn order_keyset_before(after_seconds: i64, after_id: i64) -> sea_orm::sea_query::SimpleExpr {
    Expr::cust_with_values(
        "(CAST(strftime('%s', placement_at) AS INTEGER) < ? \
         OR (CAST(strftime('%s', placement_at) AS INTEGER) = ? AND id < ?))",
        [after_seconds, after_seconds, after_id],
    )
}

impl Database for SkycourierDb {
    // health check

    async fn ping(&self) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            self.conn
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| Error::Connection(e.to_string()))?;
            Ok(())
        })
        .await
    }

    // user operations

    async fn create_user(&self, username: &str) -> Result<User> {
        with_deadline(POINT_OP_DEADLINE, async {
            let model = entity::user::ActiveModel {
                username: Set(username.to_string()),
                role: Set(Role::EndUser.as_str().to_string()),
                ..Default::default()
            };
            let result = model.insert(&self.conn).await?;
            Ok(result.into())
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::user::Entity::find_by_id(id.0).one(&self.conn).await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::user::Entity::find()
                .filter(entity::user::Column::Username.eq(username))
                .one(&self.conn)
                .await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn list_users(&self, limit: u64, offset: u64) -> Result<Vec<User>> {
        with_deadline(LIST_OP_DEADLINE, async {
            let limit = if limit == 0 { MAX_PAGE_SIZE } else { limit };
            let results = entity::user::Entity::find()
                .order_by_asc(entity::user::Column::Id)
                .limit(limit)
                .offset(offset)
                .all(&self.conn)
                .await?;
            Ok(results.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn update_role_by_username(&self, username: &str, role: Role) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::user::Entity::update_many()
                .col_expr(
                    entity::user::Column::Role,
                    Expr::value(role.as_str().to_string()),
                )
                .filter(entity::user::Column::Username.eq(username))
                .exec(&self.conn)
                .await?;
            if result.rows_affected == 0 {
                return Err(Error::NotFound(format!("user {username}")));
            }
            Ok(())
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::user::Entity::delete_by_id(id.0).exec(&self.conn).await?;
            Ok(())
        })
        .await
    }

    // order operations

    async fn create_order(&self, order: &Order) -> Result<Order> {
        with_deadline(POINT_OP_DEADLINE, async {
            let model: entity::order::ActiveModel = order.into();
            // the insert reads the row back, so the db-generated placement_at
            // lands on the returned order
            let result = model.insert(&self.conn).await?;
            Ok(result.into())
        })
        .await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::order::Entity::find_by_id(id.0).one(&self.conn).await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::order::Entity::update_many()
                .col_expr(
                    entity::order::Column::Status,
                    Expr::value(status.as_str().to_string()),
                )
                .filter(entity::order::Column::Id.eq(id.0))
                .exec(&self.conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn update_pickup_location(&self, id: OrderId, pickup: Coordinates) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::order::Entity::update_many()
                .col_expr(entity::order::Column::PickupLat, Expr::value(Some(pickup.lat)))
                .col_expr(entity::order::Column::PickupLng, Expr::value(Some(pickup.lng)))
                .filter(entity::order::Column::Id.eq(id.0))
                .exec(&self.conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn update_order_locations(
        &self,
        id: OrderId,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::order::Entity::update_many()
                .col_expr(entity::order::Column::OriginLat, Expr::value(origin.lat))
                .col_expr(entity::order::Column::OriginLng, Expr::value(origin.lng))
                .col_expr(entity::order::Column::DestLat, Expr::value(destination.lat))
                .col_expr(entity::order::Column::DestLng, Expr::value(destination.lng))
                .filter(entity::order::Column::Id.eq(id.0))
                .exec(&self.conn)
                .await?;
            if result.rows_affected == 0 {
                return Err(Error::NotFound(format!("order {id}")));
            }
            Ok(())
        })
        .await
    }

    async fn append_drone_path(&self, order_id: OrderId, drone_id: DroneId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, append_drone_path_on(&self.conn, order_id, drone_id))
            .await
    }

    async fn is_drone_in_path(&self, order_id: OrderId, drone_id: DroneId) -> Result<bool> {
        with_deadline(POINT_OP_DEADLINE, async {
            let Some(model) = entity::order::Entity::find_by_id(order_id.0)
                .one(&self.conn)
                .await?
            else {
                return Ok(false);
            };
            let Some(path) = model.drone_path else {
                return Ok(false);
            };
            let needle = drone_id.0.to_string();
            Ok(path.split(',').any(|part| part.trim() == needle))
        })
        .await
    }

    async fn find_next_available_for_reservation(
        &self,
        drone_id: DroneId,
    ) -> Result<Option<Order>> {
        with_deadline(LIST_OP_DEADLINE, async {
            // a left join surfaces orders with no current assignee; the
            // comma-padded instr match keeps drone 12 from colliding with 123
            let stmt = Statement::from_sql_and_values(
                DbBackend::Sqlite,
                r#"SELECT o.id AS id,
       o.origin_lat AS origin_lat, o.origin_lng AS origin_lng,
       o.dest_lat AS dest_lat, o.dest_lng AS dest_lng,
       o.status AS status, o.placement_at AS placement_at,
       o.submitted_by AS submitted_by,
       o.pickup_lat AS pickup_lat, o.pickup_lng AS pickup_lng,
       o.drone_path AS drone_path
FROM orders o
LEFT JOIN drones d ON d.assigned_job = o.id
WHERE d.id IS NULL
  AND o.status IN ('to_pick_up', 'placed')
  AND (o.drone_path IS NULL OR instr(',' || o.drone_path || ',', ',' || ? || ',') = 0)
ORDER BY CASE WHEN o.status = 'to_pick_up' THEN 0 ELSE 1 END,
         o.placement_at ASC, o.id ASC
LIMIT 1"#,
                [drone_id.0.into()],
            );
            let result = entity::order::Entity::find()
                .from_raw_sql(stmt)
                .one(&self.conn)
                .await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn get_assigned_order_for_drone(&self, drone_id: DroneId) -> Result<Option<Order>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::drone::Entity::find_by_id(drone_id.0)
                .find_also_related(entity::order::Entity)
                .one(&self.conn)
                .await?;
            Ok(result.and_then(|(_, order)| order.map(Into::into)))
        })
        .await
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::order::Entity::delete_by_id(id.0).exec(&self.conn).await?;
            Ok(())
        })
        .await
    }

    async fn list_orders_for_user_page(
        &self,
        user_id: UserId,
        page_size: u64,
        after_seconds: i64,
        after_id: i64,
    ) -> Result<Vec<Order>> {
        with_deadline(LIST_OP_DEADLINE, async {
            let page_size = clamp_page_size(page_size);
            let mut query = entity::order::Entity::find()
                .filter(entity::order::Column::SubmittedBy.eq(user_id.0));
            if after_seconds > 0 && after_id > 0 {
                query = query.filter(order_keyset_before(after_seconds, after_id));
            }
            let results = query
                .order_by(entity::order::Column::PlacementAt, SortOrder::Desc)
                .order_by(entity::order::Column::Id, SortOrder::Desc)
                .limit(page_size)
                .all(&self.conn)
                .await?;
            Ok(results.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn list_orders_admin(&self, params: ListOrdersAdminParams) -> Result<Vec<Order>> {
        with_deadline(LIST_OP_DEADLINE, async {
            let page_size = clamp_page_size(params.page_size);
            let mut query = entity::order::Entity::find();
            if !params.statuses.is_empty() {
                let statuses: Vec<&str> =
                    params.statuses.iter().map(OrderStatus::as_str).collect();
                query = query.filter(entity::order::Column::Status.is_in(statuses));
            }
            if let Some(user_id) = params.submitted_by {
                query = query.filter(entity::order::Column::SubmittedBy.eq(user_id.0));
            }
            if let Some(from) = &params.placement_from {
                query = query.filter(entity::order::Column::PlacementAt.gte(from.clone()));
            }
            if let Some(to) = &params.placement_to {
                query = query.filter(entity::order::Column::PlacementAt.lte(to.clone()));
            }
            if params.after_seconds > 0 && params.after_id > 0 {
                query = query.filter(order_keyset_before(params.after_seconds, params.after_id));
            }
            let results = query
                .order_by(entity::order::Column::PlacementAt, SortOrder::Desc)
                .order_by(entity::order::Column::Id, SortOrder::Desc)
                .limit(page_size)
                .all(&self.conn)
                .await?;
            Ok(results.into_iter().map(Into::into).collect())
        })
        .await
    }

    // drone operations

    async fn create_drone(&self, drone: &Drone) -> Result<Drone> {
        with_deadline(POINT_OP_DEADLINE, async {
            let model: entity::drone::ActiveModel = drone.into();
            let result = model.insert(&self.conn).await?;
            Ok(result.into())
        })
        .await
    }

    async fn get_drone(&self, id: DroneId) -> Result<Option<Drone>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::drone::Entity::find_by_id(id.0).one(&self.conn).await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn get_drone_by_serial(&self, serial: &str) -> Result<Option<Drone>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::drone::Entity::find()
                .filter(entity::drone::Column::SerialNumber.eq(serial))
                .one(&self.conn)
                .await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn get_drone_by_name(&self, name: &str) -> Result<Option<Drone>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::drone::Entity::find()
                .filter(entity::drone::Column::Name.eq(name))
                .order_by_asc(entity::drone::Column::Id)
                .one(&self.conn)
                .await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn get_drone_by_assigned_order(&self, order_id: OrderId) -> Result<Option<Drone>> {
        with_deadline(POINT_OP_DEADLINE, async {
            let result = entity::drone::Entity::find()
                .filter(entity::drone::Column::AssignedJob.eq(Some(order_id.0)))
                .one(&self.conn)
                .await?;
            Ok(result.map(Into::into))
        })
        .await
    }

    async fn update_drone_location_and_speed(
        &self,
        id: DroneId,
        location: Coordinates,
        speed_mph: f64,
    ) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::drone::Entity::update_many()
                .col_expr(entity::drone::Column::Lat, Expr::value(location.lat))
                .col_expr(entity::drone::Column::Lng, Expr::value(location.lng))
                .col_expr(entity::drone::Column::SpeedMph, Expr::value(speed_mph))
                .filter(entity::drone::Column::Id.eq(id.0))
                .exec(&self.conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn update_drone_status(&self, id: DroneId, status: DroneStatus) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::drone::Entity::update_many()
                .col_expr(
                    entity::drone::Column::Status,
                    Expr::value(status.as_str().to_string()),
                )
                .filter(entity::drone::Column::Id.eq(id.0))
                .exec(&self.conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn assign_job(&self, drone_id: DroneId, order_id: OrderId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, assign_job_on(&self.conn, drone_id, order_id)).await
    }

    async fn unassign_job(&self, drone_id: DroneId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::drone::Entity::update_many()
                .col_expr(
                    entity::drone::Column::AssignedJob,
                    Expr::value(Option::<i64>::None),
                )
                .filter(entity::drone::Column::Id.eq(drone_id.0))
                .exec(&self.conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn reserve_with_path(&self, drone_id: DroneId, order_id: OrderId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            let txn = self.conn.begin().await?;
            assign_job_on(&txn, drone_id, order_id).await?;
            append_drone_path_on(&txn, order_id, drone_id).await?;
            txn.commit().await?;
            Ok(())
        })
        .await
    }

    async fn delete_drone(&self, id: DroneId) -> Result<()> {
        with_deadline(POINT_OP_DEADLINE, async {
            entity::drone::Entity::delete_by_id(id.0).exec(&self.conn).await?;
            Ok(())
        })
        .await
    }

    async fn list_drones_admin(&self, params: ListDronesAdminParams) -> Result<Vec<Drone>> {
        with_deadline(LIST_OP_DEADLINE, async {
            let page_size = clamp_page_size(params.page_size);
            let mut query = entity::drone::Entity::find();
            if let Some(status) = params.status {
                query = query.filter(entity::drone::Column::Status.eq(status.as_str()));
            }
            if params.assigned_only {
                query = query.filter(entity::drone::Column::AssignedJob.is_not_null());
            }
            if params.unassigned_only {
                query = query.filter(entity::drone::Column::AssignedJob.is_null());
            }
            if let Some(needle) = params
                .name_or_serial_contains
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                // instr keeps the match case-sensitive; LIKE would not be
                query = query.filter(
                    Condition::any()
                        .add(Expr::cust_with_values("instr(name, ?) > 0", [needle]))
                        .add(Expr::cust_with_values("instr(serial_number, ?) > 0", [needle])),
                );
            }
            if params.after_id > 0 {
                query = query.filter(entity::drone::Column::Id.gt(params.after_id));
            }
            let results = query
                .order_by_asc(entity::drone::Column::Id)
                .limit(page_size)
                .all(&self.conn)
                .await?;
            Ok(results.into_iter().map(Into::into).collect())
        })
        .await
    }
}
