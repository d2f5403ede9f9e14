use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_test::assert_ok;
use val_compat::ids::*;
use val_compat::{FakeVehicle, PropertyManagerCompat, StaticPermissions};
use val_core::{ErrorCode, PropertyValue};
use val_registry::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compat(fake: &Arc<FakeVehicle>) -> Arc<PropertyManagerCompat> {
    init_tracing();
    Arc::new(PropertyManagerCompat::new(fake.clone()))
}

fn window_actions(fake: &Arc<FakeVehicle>) -> WindowActions {
    let permissions = Arc::new(StaticPermissions::granting([WINDOWS_PERMISSION, CLIMATE_PERMISSION]));
    WindowActions::new(compat(fake), permissions, Handle::current()).unwrap()
}

fn door_actions(fake: &Arc<FakeVehicle>) -> DoorActions {
    let permissions = Arc::new(StaticPermissions::granting([DOORS_PERMISSION]));
    DoorActions::new(compat(fake), permissions, Handle::current()).unwrap()
}

fn steering_wheel_actions(fake: &Arc<FakeVehicle>) -> SteeringWheelActions {
    let permissions = Arc::new(StaticPermissions::granting([CLIMATE_PERMISSION]));
    SteeringWheelActions::new(compat(fake), permissions, Handle::current()).unwrap()
}

fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_window_open_and_vent_share_one_position() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = window_actions(&fake);
    let driver = names(&["WINDOW_ROW_1_LEFT"]);

    assert_ok!(actions.set_open_position(driver.clone(), 4).await);
    assert_eq!(fake.value(WINDOW_POS, WINDOW_ROW_1_LEFT), Some(PropertyValue::Int(4)));
    let open = actions.get_open_position(driver.clone()).await.unwrap();
    assert_eq!(open.get("WINDOW_ROW_1_LEFT"), Some(&Ok(4)));
    let vent = actions.get_vent_position(driver.clone()).await.unwrap();
    assert_eq!(vent.get("WINDOW_ROW_1_LEFT"), Some(&Ok(0)));

    assert_ok!(actions.set_vent_position(driver.clone(), 3).await);
    assert_eq!(fake.value(WINDOW_POS, WINDOW_ROW_1_LEFT), Some(PropertyValue::Int(-3)));
    let vent = actions.get_vent_position(driver.clone()).await.unwrap();
    assert_eq!(vent.get("WINDOW_ROW_1_LEFT"), Some(&Ok(3)));
    let open = actions.get_open_position(driver.clone()).await.unwrap();
    assert_eq!(open.get("WINDOW_ROW_1_LEFT"), Some(&Ok(0)));
    let is_open = actions.is_open(driver).await.unwrap();
    assert_eq!(is_open.get("WINDOW_ROW_1_LEFT"), Some(&Ok(true)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_window_close_reports_already_closed() {
    let fake = Arc::new(FakeVehicle::body());
    fake.set_value(WINDOW_POS, WINDOW_ROW_2_LEFT, PropertyValue::Int(7));
    let actions = window_actions(&fake);

    let result = actions
        .close(names(&["WINDOW_ROW_2_LEFT", "WINDOW_ROW_2_RIGHT"]))
        .await
        .unwrap();
    assert_eq!(result.error_for("WINDOW_ROW_2_LEFT"), None);
    assert_eq!(result.error_for("WINDOW_ROW_2_RIGHT"), Some(ErrorCode::ValueAlreadySet));
    assert_eq!(fake.value(WINDOW_POS, WINDOW_ROW_2_LEFT), Some(PropertyValue::Int(0)));

    let is_open = actions.is_open(names(&["WINDOW_ROW_2_LEFT"])).await.unwrap();
    assert_eq!(is_open.get("WINDOW_ROW_2_LEFT"), Some(&Ok(false)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rear_windows_cannot_vent() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = window_actions(&fake);

    assert_eq!(
        actions.get_supported_windows(WINDOW_ACTION_SET_VENT_POSITION),
        Ok(names(&["WINDOW_ROW_1_LEFT", "WINDOW_ROW_1_RIGHT"]))
    );
    let ranges = actions
        .get_window_to_value_range_map(WINDOW_ACTION_SET_OPEN_POSITION)
        .unwrap();
    assert_eq!(ranges["WINDOW_ROW_2_RIGHT"].supported_values(), &(0..=10).collect::<Vec<_>>());

    let result = actions
        .set_vent_position(names(&["WINDOW_ROW_1_RIGHT", "WINDOW_ROW_2_RIGHT"]), 2)
        .await
        .unwrap();
    assert_eq!(result.error_for("WINDOW_ROW_1_RIGHT"), None);
    assert_eq!(result.error_for("WINDOW_ROW_2_RIGHT"), Some(ErrorCode::ElementNotSupported));
    assert_eq!(fake.write_count(WINDOW_POS, WINDOW_ROW_2_RIGHT), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_window_positions_validated() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = window_actions(&fake);
    let driver = names(&["WINDOW_ROW_1_LEFT"]);
    let before = fake.total_calls();

    assert_eq!(
        actions.set_open_position(driver.clone(), -1).await.err(),
        Some(ErrorCode::InvalidApiArgument)
    );
    assert_eq!(
        actions.set_vent_position(driver.clone(), -1).await.err(),
        Some(ErrorCode::InvalidApiArgument)
    );
    assert_eq!(fake.total_calls(), before);

    let result = actions.set_vent_position(driver, 6).await.unwrap();
    assert_eq!(result.error_for("WINDOW_ROW_1_LEFT"), Some(ErrorCode::ValueNotSupported));
    assert_eq!(fake.total_writes(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_window_locks_and_defrosters() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = window_actions(&fake);
    let rear = names(&["WINDOW_ROW_2_LEFT", "WINDOW_ROW_2_RIGHT"]);

    assert_ok!(actions.set_child_lock(rear.clone(), true).await);
    let locked = actions.is_child_locked(rear).await.unwrap();
    assert!(locked.is_success());
    assert_eq!(locked.get("WINDOW_ROW_2_RIGHT"), Some(&Ok(true)));
    assert_eq!(
        actions.is_child_locked(names(&["WINDOW_ROW_1_LEFT"])).await.err(),
        Some(ErrorCode::InvalidApiArgument)
    );

    assert_ok!(actions.set_hvac_defroster(names(&["WINDOW_FRONT_WINDSHIELD"]), true).await);
    assert_eq!(
        fake.value(HVAC_DEFROSTER, WINDOW_FRONT_WINDSHIELD),
        Some(PropertyValue::Bool(true))
    );
    assert_eq!(
        actions.get_supported_windows(WINDOW_ACTION_ENABLE_ELECTRIC_DEFROSTER),
        Ok(names(&["WINDOW_REAR_WINDSHIELD"]))
    );
    assert_ok!(actions.set_electric_defroster(names(&["WINDOW_REAR_WINDSHIELD"]), true).await);
    let electric = actions
        .is_electric_defroster_enabled(names(&["WINDOW_REAR_WINDSHIELD"]))
        .await
        .unwrap();
    assert_eq!(electric.get("WINDOW_REAR_WINDSHIELD"), Some(&Ok(true)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_window_permissions_are_per_action() {
    let fake = Arc::new(FakeVehicle::body());
    let permissions = Arc::new(StaticPermissions::granting([CLIMATE_PERMISSION]));
    let actions = WindowActions::new(compat(&fake), permissions, Handle::current()).unwrap();
    let category = actions.category();

    assert_eq!(
        category.is_action_supported(WINDOW_ACTION_IS_OPEN),
        Err(ErrorCode::MissingRequiredPermission)
    );
    assert_eq!(category.is_action_supported(WINDOW_ACTION_IS_HVAC_DEFROSTER_ENABLED), Ok(true));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_doors() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = door_actions(&fake);
    let front = names(&["DOOR_ROW_1_LEFT", "DOOR_ROW_1_RIGHT"]);

    assert_ok!(actions.set_position(names(&["DOOR_ROW_1_LEFT"]), 5).await);
    let open = actions.is_open(front.clone()).await.unwrap();
    assert_eq!(open.get("DOOR_ROW_1_LEFT"), Some(&Ok(true)));
    assert_eq!(open.get("DOOR_ROW_1_RIGHT"), Some(&Ok(false)));
    assert_ok!(actions.close(names(&["DOOR_ROW_1_LEFT"])).await);
    let position = actions.get_position(front.clone()).await.unwrap();
    assert_eq!(position.get("DOOR_ROW_1_LEFT"), Some(&Ok(0)));

    assert_ok!(actions.set_locked(front.clone(), true).await);
    assert_eq!(fake.value(DOOR_LOCK, DOOR_ROW_1_RIGHT), Some(PropertyValue::Bool(true)));
    let locked = actions.is_locked(front).await.unwrap();
    assert!(locked.is_success());

    assert_eq!(
        actions.get_supported_doors(DOOR_ACTION_ENABLE_CHILD_LOCK),
        Ok(names(&["DOOR_ROW_2_LEFT", "DOOR_ROW_2_RIGHT"]))
    );
    let hood = actions.set_locked(names(&["DOOR_HOOD"]), true).await.unwrap();
    assert_eq!(hood.error_for("DOOR_HOOD"), Some(ErrorCode::ElementNotSupported));
    assert_eq!(
        actions.set_position(names(&["DOOR_ROW_1_LEFT"]), -3).await.err(),
        Some(ErrorCode::InvalidApiArgument)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_steering_wheel_levels_are_global() {
    let fake = Arc::new(FakeVehicle::body());
    let actions = steering_wheel_actions(&fake);

    let result = actions.set_heating_level(2).await.unwrap();
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.action_name, STEERING_WHEEL_ACTION_SET_HEATING_LEVEL);
    assert_eq!(fake.value(HVAC_STEERING_WHEEL_HEAT, 0), Some(PropertyValue::Int(2)));
    assert_eq!(actions.get_heating_level().await.unwrap().value, Ok(2));
    assert_eq!(actions.get_cooling_level().await.unwrap().value, Ok(0));

    assert_ok!(actions.set_cooling_level(2).await);
    assert_eq!(fake.value(HVAC_STEERING_WHEEL_HEAT, 0), Some(PropertyValue::Int(-2)));
    assert_eq!(actions.get_cooling_level().await.unwrap().value, Ok(2));
    assert_eq!(actions.get_heating_level().await.unwrap().value, Ok(0));

    let too_cold = actions.set_cooling_level(3).await.unwrap();
    assert_eq!(too_cold.error_code, Some(ErrorCode::ValueNotSupported));
    assert_eq!(
        actions.set_heating_level(-1).await.err(),
        Some(ErrorCode::InvalidApiArgument)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vehicle_actions_report_supported_categories() {
    let permissions = Arc::new(StaticPermissions::all());
    let fake = Arc::new(FakeVehicle::full());
    let vehicle = VehicleActions::new(
        compat(&fake),
        permissions.clone(),
        Handle::current(),
        VehicleActionsConfig::default(),
    )
    .unwrap();

    let supported = vehicle.supported_actions();
    assert_eq!(
        supported.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["DOOR", "SEAT", "STEERING_WHEEL", "WINDOW"]
    );
    assert!(supported["WINDOW"].contains(WINDOW_ACTION_SET_VENT_POSITION));
    assert!(supported["SEAT"].contains(SEAT_ACTION_GET_FAN_SPEED));
    assert_eq!(supported["STEERING_WHEEL"].len(), 4);
    assert_eq!(vehicle.category("DOOR").map(ActionCategory::action_count), Some(10));
    assert!(vehicle.category("TRUNK").is_none());

    let climate_only = Arc::new(FakeVehicle::climate());
    let vehicle = VehicleActions::new(
        compat(&climate_only),
        permissions,
        Handle::current(),
        VehicleActionsConfig::default(),
    )
    .unwrap();
    assert_eq!(
        vehicle.supported_actions().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["SEAT"]
    );
    let heating = vehicle.steering_wheel().get_heating_level().await;
    assert_eq!(heating.err(), Some(ErrorCode::ActionNotSupported));
}
