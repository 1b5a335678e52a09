use chrono::Utc;
use diesel::{delete, dsl, insert_into, pg::Pg, prelude::*, update};
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;
use zapeat_proto::restaurant_service::{
    self as proto, restaurant_service_server::RestaurantService, CreateCustomizationGroupPayload,
    CreateCustomizationOptionPayload, CreateMenuCategoryPayload, CreateMenuItemPayload,
    CreateRestaurantPayload, DeleteRestaurantPayload, GetMenuPayload, GetRestaurantPayload,
    ListRestaurantsResponse, SetRestaurantOnlinePayload, UpdateMenuItemPricePayload,
    UpdateRestaurantPayload,
};

use crate::config::establish_connection;
use crate::error::{CatalogError, FieldViolation};
use crate::events::RestaurantEventPublisher;
use crate::hours::{parse_opening_times, WeeklyHours};
use crate::menu::{
    load_menu, load_restaurant, load_restaurants, serialize_category, serialize_group,
    serialize_menu_item, serialize_option,
};
use crate::models::{
    CustomizationGroup, CustomizationOption, FoodType, MenuCategory, MenuItem, Restaurant,
    RestaurantCategory, RestaurantChanges,
};
use crate::schema::{
    customization_groups, customization_options, menu_categories, menu_items, opening_times,
    restaurants,
};
use crate::validation::{
    parse_price, required_text, validate_group_bounds, validate_restaurant,
};

pub struct RestaurantServiceImpl {
    database_url: String,
}

impl RestaurantServiceImpl {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    fn connect(&self) -> Result<PgConnection, CatalogError> {
        Ok(establish_connection(&self.database_url)?)
    }
}

#[tonic::async_trait]
impl RestaurantService for RestaurantServiceImpl {
    async fn create_restaurant(
        &self,
        request: Request<CreateRestaurantPayload>,
    ) -> Result<Response<proto::Restaurant>, Status> {
        let payload = request.into_inner();
        let (changes, hours) = restaurant_form(
            payload.name,
            payload.category,
            payload.address,
            payload.mobile_number,
            payload.email,
            &payload.opening_times,
        )?;
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name: changes.name,
            category: changes.category,
            address: changes.address,
            mobile_number: changes.mobile_number,
            email: changes.email,
            is_online: false,
            created_at: Utc::now(),
        };

        let conn = &mut self.connect()?;
        let response = conn.transaction::<_, CatalogError, _>(|conn| {
            insert_into(restaurants::table)
                .values(&restaurant)
                .execute(conn)?;
            replace_opening_times(conn, &restaurant.id, &hours)?;
            RestaurantEventPublisher::new(conn).restaurant_created(&restaurant)?;
            Ok(load_restaurant(conn, &restaurant)?)
        })?;
        info!(restaurant_id = %restaurant.id, "restaurant created");

        Ok(Response::new(response))
    }

    async fn update_restaurant(
        &self,
        request: Request<UpdateRestaurantPayload>,
    ) -> Result<Response<proto::Restaurant>, Status> {
        let payload = request.into_inner();
        let id = parse_id(&payload.restaurant_id, "Restaurant")?;
        let (changes, hours) = restaurant_form(
            payload.name,
            payload.category,
            payload.address,
            payload.mobile_number,
            payload.email,
            &payload.opening_times,
        )?;

        let conn = &mut self.connect()?;
        let response = conn.transaction::<_, CatalogError, _>(|conn| {
            lock_restaurant(conn, &id)?;
            let restaurant = update(restaurants::table.find(&id))
                .set(&changes)
                .returning(Restaurant::as_returning())
                .get_result(conn)?;
            if !hours.is_empty() {
                replace_opening_times(conn, &id, &hours)?;
            }
            RestaurantEventPublisher::new(conn).restaurant_updated(&restaurant)?;
            Ok(load_restaurant(conn, &restaurant)?)
        })?;
        info!(restaurant_id = %id, "restaurant updated");

        Ok(Response::new(response))
    }

    async fn delete_restaurant(
        &self,
        request: Request<DeleteRestaurantPayload>,
    ) -> Result<Response<()>, Status> {
        let id = parse_id(&request.into_inner().restaurant_id, "Restaurant")?;
        let conn = &mut self.connect()?;
        conn.transaction::<_, CatalogError, _>(|conn| {
            let restaurant = lock_restaurant(conn, &id)?;
            delete(restaurants::table.find(&id)).execute(conn)?;
            RestaurantEventPublisher::new(conn).restaurant_deleted(&restaurant)?;
            Ok(())
        })?;
        info!(restaurant_id = %id, "restaurant deleted");

        Ok(Response::new(()))
    }

    async fn get_restaurant(
        &self,
        request: Request<GetRestaurantPayload>,
    ) -> Result<Response<proto::Restaurant>, Status> {
        let id = parse_id(&request.into_inner().restaurant_id, "Restaurant")?;
        let conn = &mut self.connect()?;
        let restaurant = find_restaurant(conn, &id)?;
        let response = load_restaurant(conn, &restaurant).map_err(CatalogError::from)?;
        Ok(Response::new(response))
    }

    async fn list_restaurants(
        &self,
        _: Request<()>,
    ) -> Result<Response<ListRestaurantsResponse>, Status> {
        let conn = &mut self.connect()?;
        let results = restaurants::table
            .select(Restaurant::as_select())
            .order((restaurants::name.asc(), restaurants::id.asc()))
            .load(conn)
            .map_err(CatalogError::from)?;
        let restaurants = load_restaurants(conn, &results).map_err(CatalogError::from)?;

        Ok(Response::new(ListRestaurantsResponse { restaurants }))
    }

    async fn set_restaurant_online(
        &self,
        request: Request<SetRestaurantOnlinePayload>,
    ) -> Result<Response<proto::Restaurant>, Status> {
        let payload = request.into_inner();
        let id = parse_id(&payload.restaurant_id, "Restaurant")?;
        let conn = &mut self.connect()?;
        let restaurant = update(restaurants::table.find(&id))
            .set(restaurants::is_online.eq(payload.is_online))
            .returning(Restaurant::as_returning())
            .get_result(conn)
            .optional()
            .map_err(CatalogError::from)?
            .ok_or(CatalogError::NotFound("Restaurant"))?;
        info!(restaurant_id = %id, is_online = payload.is_online, "restaurant availability changed");

        let response = load_restaurant(conn, &restaurant).map_err(CatalogError::from)?;
        Ok(Response::new(response))
    }

    async fn get_menu(
        &self,
        request: Request<GetMenuPayload>,
    ) -> Result<Response<proto::Menu>, Status> {
        let id = parse_id(&request.into_inner().restaurant_id, "Restaurant")?;
        let conn = &mut self.connect()?;
        let restaurant = find_restaurant(conn, &id)?;
        let menu = load_menu(conn, &restaurant).map_err(CatalogError::from)?;
        Ok(Response::new(menu))
    }

    async fn create_menu_category(
        &self,
        request: Request<CreateMenuCategoryPayload>,
    ) -> Result<Response<proto::MenuCategory>, Status> {
        let payload = request.into_inner();
        let restaurant_id = parse_id(&payload.restaurant_id, "Restaurant")?;
        CatalogError::check(required_text("name", &payload.name).into_iter().collect())?;

        let conn = &mut self.connect()?;
        let category = conn.transaction::<_, CatalogError, _>(|conn| {
            let restaurant = lock_restaurant(conn, &restaurant_id)?;
            let category = MenuCategory {
                id: Uuid::new_v4(),
                restaurant_id: restaurant.id,
                name: payload.name.trim().to_string(),
                description: payload.description,
                created_at: Utc::now(),
            };
            insert_into(menu_categories::table)
                .values(&category)
                .execute(conn)?;
            RestaurantEventPublisher::new(conn).menu_revised(&restaurant)?;
            Ok(category)
        })?;
        info!(%restaurant_id, category_id = %category.id, "menu category created");

        Ok(Response::new(serialize_category(&category, Vec::new())))
    }

    async fn create_menu_item(
        &self,
        request: Request<CreateMenuItemPayload>,
    ) -> Result<Response<proto::MenuItem>, Status> {
        let payload = request.into_inner();
        let category_id = parse_id(&payload.category_id, "Menu category")?;
        let mut violations: Vec<FieldViolation> =
            required_text("name", &payload.name).into_iter().collect();
        let price = parse_price("price", payload.price.as_ref());
        violations.extend(price.clone().err());
        let food_type = parse_food_type(payload.food_type);
        violations.extend(food_type.clone().err());
        CatalogError::check(violations)?;
        let (Ok(price), Ok(food_type)) = (price, food_type) else {
            return Err(Status::invalid_argument("Invalid menu item"));
        };

        let conn = &mut self.connect()?;
        let item = conn.transaction::<_, CatalogError, _>(|conn| {
            let (category, restaurant) = find_category(conn, &category_id)?;
            let restaurant = lock_restaurant(conn, &restaurant.id)?;
            let item = MenuItem {
                id: Uuid::new_v4(),
                category_id: category.id,
                name: payload.name.trim().to_string(),
                description: payload.description,
                price,
                food_type,
                customizable: false,
                must_try: payload.must_try,
                created_at: Utc::now(),
            };
            insert_into(menu_items::table).values(&item).execute(conn)?;
            RestaurantEventPublisher::new(conn).menu_revised(&restaurant)?;
            Ok(item)
        })?;
        info!(%category_id, menu_item_id = %item.id, price = %item.price, "menu item created");

        Ok(Response::new(serialize_menu_item(&item, Vec::new())))
    }

    async fn update_menu_item_price(
        &self,
        request: Request<UpdateMenuItemPricePayload>,
    ) -> Result<Response<proto::MenuItem>, Status> {
        let payload = request.into_inner();
        let item_id = parse_id(&payload.menu_item_id, "Menu item")?;
        let price = parse_price("price", payload.price.as_ref())
            .map_err(|v| CatalogError::Validation(vec![v]))?;

        let conn = &mut self.connect()?;
        let (item, groups) = conn.transaction::<_, CatalogError, _>(|conn| {
            let (item, restaurant) = find_menu_item(conn, &item_id)?;
            let restaurant = lock_restaurant(conn, &restaurant.id)?;
            let item = update(menu_items::table.find(&item.id))
                .set(menu_items::price.eq(&price))
                .returning(MenuItem::as_returning())
                .get_result(conn)?;
            RestaurantEventPublisher::new(conn).menu_revised(&restaurant)?;

            let groups = CustomizationGroup::belonging_to(&item)
                .select(CustomizationGroup::as_select())
                .order(customization_groups::created_at.asc())
                .load(conn)?;
            let options = CustomizationOption::belonging_to(&groups)
                .select(CustomizationOption::as_select())
                .order(customization_options::created_at.asc())
                .load(conn)?
                .grouped_by(&groups);
            let groups = groups
                .iter()
                .zip(options)
                .map(|(g, options)| serialize_group(g, options.iter().map(serialize_option).collect()))
                .collect::<Vec<_>>();
            Ok((item, groups))
        })?;
        info!(menu_item_id = %item.id, price = %item.price, "menu item price updated");

        Ok(Response::new(serialize_menu_item(&item, groups)))
    }

    async fn create_customization_group(
        &self,
        request: Request<CreateCustomizationGroupPayload>,
    ) -> Result<Response<proto::CustomizationGroup>, Status> {
        let payload = request.into_inner();
        let item_id = parse_id(&payload.menu_item_id, "Menu item")?;
        let min_options = payload.min_options_allowed.unwrap_or(0);
        let max_options = payload.max_options_allowed.unwrap_or(1);
        let mut violations: Vec<FieldViolation> =
            required_text("name", &payload.name).into_iter().collect();
        violations.extend(validate_group_bounds(min_options, max_options));
        CatalogError::check(violations)?;

        let conn = &mut self.connect()?;
        let group = conn.transaction::<_, CatalogError, _>(|conn| {
            let (item, restaurant) = find_menu_item(conn, &item_id)?;
            let restaurant = lock_restaurant(conn, &restaurant.id)?;
            let group = CustomizationGroup {
                id: Uuid::new_v4(),
                menu_item_id: item.id,
                name: payload.name.trim().to_string(),
                min_options_allowed: min_options,
                max_options_allowed: max_options,
                created_at: Utc::now(),
            };
            insert_into(customization_groups::table)
                .values(&group)
                .execute(conn)?;
            update(menu_items::table.find(&item.id))
                .set(menu_items::customizable.eq(true))
                .execute(conn)?;
            RestaurantEventPublisher::new(conn).menu_revised(&restaurant)?;
            Ok(group)
        })?;
        info!(menu_item_id = %item_id, group_id = %group.id, "customization group created");

        Ok(Response::new(serialize_group(&group, Vec::new())))
    }

    async fn create_customization_option(
        &self,
        request: Request<CreateCustomizationOptionPayload>,
    ) -> Result<Response<proto::CustomizationOption>, Status> {
        let payload = request.into_inner();
        let group_id = parse_id(&payload.group_id, "Customization group")?;
        let mut violations: Vec<FieldViolation> =
            required_text("name", &payload.name).into_iter().collect();
        let price = parse_price("price", payload.price.as_ref());
        violations.extend(price.clone().err());
        let food_type = parse_food_type(payload.food_type);
        violations.extend(food_type.clone().err());
        CatalogError::check(violations)?;
        let (Ok(price), Ok(food_type)) = (price, food_type) else {
            return Err(Status::invalid_argument("Invalid customization option"));
        };

        let conn = &mut self.connect()?;
        let option = conn.transaction::<_, CatalogError, _>(|conn| {
            let (group, restaurant) = find_group(conn, &group_id)?;
            let restaurant = lock_restaurant(conn, &restaurant.id)?;
            let option = CustomizationOption {
                id: Uuid::new_v4(),
                group_id: group.id,
                name: payload.name.trim().to_string(),
                price,
                food_type,
                created_at: Utc::now(),
            };
            insert_into(customization_options::table)
                .values(&option)
                .execute(conn)?;
            RestaurantEventPublisher::new(conn).menu_revised(&restaurant)?;
            Ok(option)
        })?;
        info!(%group_id, option_id = %option.id, price = %option.price, "customization option created");

        Ok(Response::new(serialize_option(&option)))
    }
}

/// Unparseable ids cannot name an existing row.
fn parse_id(value: &str, entity: &'static str) -> Result<Uuid, CatalogError> {
    value.parse().map_err(|_| CatalogError::NotFound(entity))
}

fn parse_food_type(value: i32) -> Result<FoodType, FieldViolation> {
    proto::FoodType::try_from(value)
        .map(FoodType::from)
        .map_err(|_| FieldViolation::new("food_type", "Unknown food type"))
}

/// Validates the writable restaurant fields shared by create and update.
fn restaurant_form(
    name: String,
    category: i32,
    address: String,
    mobile_number: String,
    email: String,
    opening_times: &[proto::OpeningTime],
) -> Result<(RestaurantChanges, Vec<WeeklyHours>), CatalogError> {
    let mut violations = validate_restaurant(&name, &mobile_number, &email);
    let category = proto::RestaurantCategory::try_from(category)
        .map(RestaurantCategory::from)
        .map_err(|_| FieldViolation::new("category", "Unknown restaurant category"));
    violations.extend(category.clone().err());
    let hours = parse_opening_times(opening_times);
    if let Err(ref hour_violations) = hours {
        violations.extend(hour_violations.iter().cloned());
    }
    CatalogError::check(violations)?;
    let (Ok(category), Ok(hours)) = (category, hours) else {
        return Err(CatalogError::Validation(Vec::new()));
    };
    let changes = RestaurantChanges {
        name: name.trim().to_string(),
        category,
        address,
        mobile_number,
        email,
    };
    Ok((changes, hours))
}

fn replace_opening_times(
    conn: &mut PgConnection,
    restaurant_id: &Uuid,
    hours: &[WeeklyHours],
) -> QueryResult<()> {
    delete(opening_times::table.filter(opening_times::restaurant_id.eq(restaurant_id)))
        .execute(conn)?;
    if !hours.is_empty() {
        let rows: Vec<_> = hours.iter().map(|h| h.for_restaurant(*restaurant_id)).collect();
        insert_into(opening_times::table).values(&rows).execute(conn)?;
    }
    Ok(())
}

type LockRestaurant =
    dsl::ForUpdate<dsl::Select<dsl::Find<restaurants::table, Uuid>, dsl::AsSelect<Restaurant, Pg>>>;

fn lock_restaurant_query(id: Uuid) -> LockRestaurant {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .for_update()
}

/// Serializes writes to one restaurant's catalog. Every write that publishes
/// a menu snapshot holds this lock, so each snapshot sees all earlier writes.
fn lock_restaurant(conn: &mut PgConnection, id: &Uuid) -> Result<Restaurant, CatalogError> {
    lock_restaurant_query(*id)
        .get_result(conn)
        .optional()?
        .ok_or(CatalogError::NotFound("Restaurant"))
}

fn find_restaurant(conn: &mut PgConnection, id: &Uuid) -> Result<Restaurant, CatalogError> {
    restaurants::table
        .find(id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or(CatalogError::NotFound("Restaurant"))
}

fn find_category(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<(MenuCategory, Restaurant), CatalogError> {
    menu_categories::table
        .inner_join(restaurants::table)
        .filter(menu_categories::id.eq(id))
        .select((MenuCategory::as_select(), Restaurant::as_select()))
        .first(conn)
        .optional()?
        .ok_or(CatalogError::NotFound("Menu category"))
}

fn find_menu_item(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<(MenuItem, Restaurant), CatalogError> {
    menu_items::table
        .inner_join(menu_categories::table.inner_join(restaurants::table))
        .filter(menu_items::id.eq(id))
        .select((MenuItem::as_select(), Restaurant::as_select()))
        .first(conn)
        .optional()?
        .ok_or(CatalogError::NotFound("Menu item"))
}

fn find_group(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<(CustomizationGroup, Restaurant), CatalogError> {
    customization_groups::table
        .inner_join(
            menu_items::table.inner_join(menu_categories::table.inner_join(restaurants::table)),
        )
        .filter(customization_groups::id.eq(id))
        .select((CustomizationGroup::as_select(), Restaurant::as_select()))
        .first(conn)
        .optional()?
        .ok_or(CatalogError::NotFound("Customization group"))
}

#[cfg(test)]
mod tests {
    use prost::Message;
    use tonic::Code;

    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let status = Status::from(parse_id("not-a-uuid", "Menu item").unwrap_err());
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "Menu item not found");
    }

    #[test]
    fn unknown_food_type_is_a_violation() {
        assert_eq!(parse_food_type(proto::FoodType::Egg as i32), Ok(FoodType::Egg));
        assert_eq!(parse_food_type(9).unwrap_err().field, "food_type");
    }

    #[test]
    fn restaurant_lock_selects_for_update() {
        let id = Uuid::new_v4();
        let sql = diesel::debug_query::<Pg, _>(&lock_restaurant_query(id)).to_string();
        assert!(sql.contains("FROM \"restaurants\""), "{sql}");
        assert!(sql.contains("FOR UPDATE"), "{sql}");
    }

    fn service() -> RestaurantServiceImpl {
        RestaurantServiceImpl::new("postgres://unreachable.invalid/zapeat")
    }

    fn violated_fields(status: &Status) -> Vec<String> {
        zapeat_proto::common::ValidationErrors::decode(status.details())
            .unwrap()
            .violations
            .into_iter()
            .map(|v| v.field)
            .collect()
    }

    #[tokio::test]
    async fn update_is_validated_before_touching_the_database() {
        let status = service()
            .update_restaurant(Request::new(UpdateRestaurantPayload {
                restaurant_id: Uuid::new_v4().to_string(),
                name: "Burger Barn".to_string(),
                mobile_number: "+919876543210".to_string(),
                email: "no-at-sign".to_string(),
                opening_times: vec![proto::OpeningTime {
                    weekday: 8,
                    from_hour: "09:00".to_string(),
                    to_hour: "17:00".to_string(),
                }],
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(
            violated_fields(&status),
            vec!["email", "opening_times[0].weekday"]
        );
    }

    #[tokio::test]
    async fn update_and_delete_of_malformed_id_are_not_found() {
        let status = service()
            .update_restaurant(Request::new(UpdateRestaurantPayload {
                restaurant_id: "burger-barn".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let status = service()
            .delete_restaurant(Request::new(DeleteRestaurantPayload {
                restaurant_id: "burger-barn".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn invalid_restaurant_is_rejected_before_touching_the_database() {
        let service = RestaurantServiceImpl::new("postgres://unreachable.invalid/zapeat");
        let status = service
            .create_restaurant(Request::new(CreateRestaurantPayload {
                name: String::new(),
                mobile_number: "12".to_string(),
                email: "owner@example.com".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn group_bounds_are_checked_before_touching_the_database() {
        let service = RestaurantServiceImpl::new("postgres://unreachable.invalid/zapeat");
        let status = service
            .create_customization_group(Request::new(CreateCustomizationGroupPayload {
                menu_item_id: Uuid::new_v4().to_string(),
                name: "Toppings".to_string(),
                min_options_allowed: Some(3),
                max_options_allowed: Some(2),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }
}
