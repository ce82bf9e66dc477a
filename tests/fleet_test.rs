use shuttle_router::fleet::FleetInventory;
use shuttle_router::models::employee::RoutedEmployee;
use shuttle_router::models::{Employee, FleetClass, Gender, Profile, TripType};

fn employee(code: &str, gender: Gender) -> Employee {
    Employee {
        emp_code: code.to_string(),
        lat: 0.0,
        lng: 0.0,
        gender,
        is_medical: false,
        is_pwd: false,
        is_nmt: false,
        is_oob: false,
        zone: "Z".into(),
        dist_to_facility_km: 1.0,
    }
}

#[test]
fn guard_consumes_a_seat_when_critical_seat_is_female() {
    let mut profile = Profile::default();
    profile.fleet = vec![FleetClass { vehicle_type: "s".into(), capacity: 4, count: 1 }];
    let mut inventory = FleetInventory::new(&profile);

    let mut employees: Vec<RoutedEmployee> = vec![
        RoutedEmployee::new(employee("a", Gender::F), 1),
        RoutedEmployee::new(employee("b", Gender::M), 2),
        RoutedEmployee::new(employee("c", Gender::M), 3),
    ];

    let assignment = inventory.allocate(&mut employees, TripType::Pickup, true).unwrap();
    assert!(assignment.guard_needed);
    assert_eq!(employees.len(), 3);
    assert_eq!(assignment.vehicle_capacity, 4);
}

#[test]
fn guard_inactive_never_sets_guard_needed() {
    let mut profile = Profile::default();
    profile.fleet = vec![FleetClass { vehicle_type: "s".into(), capacity: 4, count: 1 }];
    let mut inventory = FleetInventory::new(&profile);

    let mut employees: Vec<RoutedEmployee> = vec![RoutedEmployee::new(employee("a", Gender::F), 1)];
    let assignment = inventory.allocate(&mut employees, TripType::Pickup, false).unwrap();
    assert!(!assignment.guard_needed);
}
