//! Orchestrator (C11, §4.11): drives the full pipeline — zoning, optional
//! zone-clubbing, group formation, polishing, fleet assignment, guard
//! resolution, deviation/ETA validation, and unrouted recovery — and
//! synthesizes the response envelope.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use petgraph::graph::UnGraph;
use petgraph::visit::Bfs;

use crate::error::PipelineError;
use crate::fleet::FleetInventory;
use crate::geo::haversine_km;
use crate::guard::attempt_guard_swap;
use crate::models::employee::renumber;
use crate::models::response::{OverallRouteDetails, RouteSummary, UnroutedEmployeeOut};
use crate::models::{Employee, Facility, Route, RouteRequest, RouteResponse, RoutedEmployee, TripType, Zone};
use crate::polish::{build_route, polish_group};
use crate::services::osrm::RoadService;
use crate::services::vrp_solver::VrpSolver;
use crate::time::{decimal_hour, hhmm_to_seconds, parse_hhmm};
use crate::unrouted::recycle_unrouted;
use crate::validate::{check_deviation, check_duration, synthesize_eta};
use crate::zone_assigner::assign_zones;

pub struct Orchestrator {
    road: Arc<dyn RoadService>,
    solver: Arc<dyn VrpSolver>,
}

impl Orchestrator {
    pub fn new(road: Arc<dyn RoadService>, solver: Arc<dyn VrpSolver>) -> Self {
        Orchestrator { road, solver }
    }

    pub async fn process(&self, request: RouteRequest) -> Result<RouteResponse, PipelineError> {
        let (hour, minute) = parse_hhmm(&request.shift_time)?;
        let shift_decimal_hour = decimal_hour(hour, minute);
        let shift_seconds = hhmm_to_seconds(&request.shift_time)?;
        let reporting_time_s = request.reporting_time as i64;
        let pickup_time_per_employee_s = request.pickup_time_per_employee as i64;
        let trip_type = request.trip_type;

        let total_employees = request.employees.len() as u32;
        let facility = Facility::new(request.facility, request.profile);

        let mut employees: Vec<Employee> = request.employees.into_iter().map(Employee::from).collect();
        for e in &mut employees {
            if e.has_valid_coordinates() {
                e.dist_to_facility_km = haversine_km((e.lat, e.lng), facility.point());
            }
        }

        let zones: Vec<Zone> = request.zones.unwrap_or_default().into_iter().map(Zone::from).collect();
        let invalid_coordinates: Vec<Employee> = employees.iter().filter(|e| !e.has_valid_coordinates()).cloned().collect();
        let by_zone = assign_zones(&employees, &zones);

        let mut unrouted_pool: Vec<Employee> = invalid_coordinates;
        let mut routes: Vec<Route> = Vec::new();

        let clusters = self.cluster_zones(&by_zone, &facility);
        for (cluster_label, zone_names) in clusters {
            let mut pool: Vec<Employee> = Vec::new();
            for zone_name in &zone_names {
                if let Some(zone_employees) = by_zone.get(zone_name) {
                    pool.extend(zone_employees.iter().cloned());
                }
            }
            if pool.is_empty() {
                continue;
            }

            let outcome = crate::grouping::form_groups(&cluster_label, pool, &facility, self.road.as_ref(), trip_type, shift_decimal_hour).await;
            unrouted_pool.extend(outcome.deferred);

            for group in outcome.groups {
                let group_backup = group.employees.clone();
                let polished = match polish_group(group.employees, &facility, self.road.as_ref(), self.solver.as_ref(), trip_type).await {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("polish failed for a group in {}, returning to unrouted: {}", cluster_label, e);
                        unrouted_pool.extend(group_backup);
                        continue;
                    }
                };
                unrouted_pool.extend(polished.dropped);

                if polished.ordered.is_empty() {
                    continue;
                }

                let mut routed: Vec<RoutedEmployee> =
                    polished.ordered.into_iter().enumerate().map(|(i, e)| RoutedEmployee::new(e, (i + 1) as u32)).collect();

                let mut inventory = FleetInventory::new(&facility.profile);
                let assignment = inventory.allocate(&mut routed, trip_type, request.guard)?;
                unrouted_pool.extend(assignment.trimmed.into_iter().map(|re| re.employee));

                if routed.is_empty() {
                    continue;
                }

                let unique_key = format!("{}-{}-{}", cluster_label, trip_type.short_code(), routes.len());
                let ordered_employees: Vec<Employee> = routed.into_iter().map(|re| re.employee).collect();
                let ordered_backup = ordered_employees.clone();
                let mut route =
                    match build_route(unique_key, cluster_label.clone(), ordered_employees, &facility, self.road.as_ref(), trip_type, shift_decimal_hour).await {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("route build failed for a group in {}, returning to unrouted: {}", cluster_label, e);
                            unrouted_pool.extend(ordered_backup);
                            continue;
                        }
                    };
                route.assigned_vehicle_type = assignment.vehicle_type;
                route.vehicle_capacity = assignment.vehicle_capacity;
                route.guard_needed = assignment.guard_needed;
                route.after_fleet_exhaustion = assignment.after_fleet_exhaustion;
                route.is_special_needs_route = assignment.is_special_needs_route;

                self.finalize_route(&mut route, &facility, shift_decimal_hour, shift_seconds, reporting_time_s, pickup_time_per_employee_s, false).await;
                if route.error.is_some() || route.duration_exceeded {
                    warn!("dissolving route {}: {:?}", route.unique_key, route.error);
                    unrouted_pool.extend(route.employees.into_iter().map(|re| re.employee));
                } else {
                    routes.push(route);
                }
            }
        }

        let recycle_outcome =
            recycle_unrouted(unrouted_pool, &facility, self.road.as_ref(), self.solver.as_ref(), trip_type, shift_decimal_hour, "RECYCLE").await;

        let mut still_unrouted = recycle_outcome.still_unrouted;
        for mut route in recycle_outcome.routes {
            self.finalize_route(&mut route, &facility, shift_decimal_hour, shift_seconds, reporting_time_s, pickup_time_per_employee_s, true).await;
            if route.error.is_some() || route.duration_exceeded {
                warn!("dissolving recycled route {}: {:?}", route.unique_key, route.error);
                still_unrouted.extend(route.employees.into_iter().map(|re| re.employee));
            } else {
                routes.push(route);
            }
        }

        Ok(self.build_response(request.uuid, request.date, request.shift_time, trip_type, total_employees, routes, still_unrouted))
    }

    /// Guard resolution, deviation/duration validation, and ETA synthesis —
    /// the steps every committed route goes through regardless of which
    /// component formed it (§4.8, §4.7, §4.9). A failed guard swap or
    /// deviation check is component-local (§7 propagation policy): it is
    /// logged and, for the deviation check, recorded onto `route.error` so
    /// the caller dissolves the route instead of committing it half-validated.
    async fn finalize_route(
        &self,
        route: &mut Route,
        facility: &Facility,
        shift_decimal_hour: f64,
        shift_seconds: i64,
        reporting_time_s: i64,
        pickup_time_per_employee_s: i64,
        recycler_tolerance: bool,
    ) {
        if route.guard_needed {
            if let Err(e) = attempt_guard_swap(route, facility, self.road.as_ref(), self.solver.as_ref(), shift_decimal_hour).await {
                warn!("guard swap failed for {}, keeping the guard seat: {}", route.unique_key, e);
            }
        }

        let employees: Vec<Employee> = route.employees.iter().map(|re| re.employee.clone()).collect();
        let duration_ok = check_duration(route.route_details.total_duration_s, facility.profile.max_duration);
        route.duration_exceeded = !duration_ok;

        match check_deviation(
            &employees,
            route.route_details.total_distance_m,
            facility,
            self.road.as_ref(),
            route.trip_type,
            shift_decimal_hour,
            recycler_tolerance,
        )
        .await
        {
            Ok(deviation) => {
                route.farthest_employee_distance_km = deviation.farthest_distance_km;
                if !deviation.passed {
                    route.error = Some("deviation rule exceeded".to_string());
                }
            }
            Err(e) => {
                warn!("deviation check failed for {}, dissolving route: {}", route.unique_key, e);
                route.error = Some(format!("deviation check failed: {e}"));
            }
        }

        synthesize_eta(route, shift_seconds, reporting_time_s, pickup_time_per_employee_s, shift_decimal_hour, &facility.profile.tunables);
        renumber(&mut route.employees);
    }

    /// Groups zone names into clubs via BFS over the pairing matrix when
    /// `zone_clubbing` is enabled (§4.11); otherwise each zone stands alone.
    fn cluster_zones(&self, by_zone: &HashMap<String, Vec<Employee>>, facility: &Facility) -> Vec<(String, Vec<String>)> {
        let mut zone_names: Vec<String> = by_zone.keys().cloned().collect();
        zone_names.sort();

        if !facility.profile.zone_clubbing {
            return zone_names.into_iter().map(|name| (name.clone(), vec![name])).collect();
        }

        let mut graph = UnGraph::<String, ()>::new_undirected();
        let mut index_of = HashMap::new();
        for name in &zone_names {
            index_of.insert(name.clone(), graph.add_node(name.clone()));
        }
        for (zone, partners) in &facility.profile.zone_pairing_matrix {
            if let Some(&a) = index_of.get(zone) {
                for partner in partners {
                    if let Some(&b) = index_of.get(partner) {
                        graph.update_edge(a, b, ());
                    }
                }
            }
        }

        let mut visited = vec![false; graph.node_count()];
        let mut clusters = Vec::new();
        for start in graph.node_indices() {
            if visited[start.index()] {
                continue;
            }
            let mut bfs = Bfs::new(&graph, start);
            let mut members = Vec::new();
            while let Some(node) = bfs.next(&graph) {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                members.push(graph[node].clone());
            }
            members.sort();
            let label = members.join("+");
            clusters.push((label, members));
        }
        clusters
    }

    fn build_response(
        &self,
        uuid: String,
        date: String,
        shift_time: String,
        trip_type: TripType,
        total_employees: u32,
        routes: Vec<Route>,
        still_unrouted: Vec<Employee>,
    ) -> RouteResponse {
        let total_routes = routes.len() as u32;
        let total_routed_employees: u32 = routes.iter().map(|r| r.employees.len() as u32).sum();
        let total_guarded_routes = routes.iter().filter(|r| r.guard_needed).count() as u32;
        let total_swapped_routes = routes.iter().filter(|r| r.swapped).count() as u32;
        let total_occupancy: u32 = routes.iter().map(|r| r.occupancy()).sum();
        let average_occupancy = if total_routes > 0 { total_occupancy as f64 / total_routes as f64 } else { 0.0 };

        let total_distance_km: f64 = routes.iter().map(|r| r.route_details.total_distance_m / 1000.0).sum();
        let total_duration_s: f64 = routes.iter().map(|r| r.route_details.total_duration_s).sum();

        let summaries = routes.iter().enumerate().map(|(i, r)| RouteSummary::from_route(r, (i + 1) as u32)).collect();

        let unrouted_employees = still_unrouted
            .into_iter()
            .map(|e| UnroutedEmployeeOut {
                emp_code: e.emp_code,
                gender: e.gender,
                is_medical: e.is_medical,
                is_pwd: e.is_pwd,
                is_nmt: e.is_nmt,
                is_oob: e.is_oob,
                geo_x: e.lng,
                geo_y: e.lat,
                reason: Some("could not be fit into any feasible route".to_string()),
            })
            .collect();

        RouteResponse {
            uuid,
            date,
            shift: shift_time,
            trip_type: trip_type.as_str().to_string(),
            total_employees,
            total_routed_employees,
            total_routes,
            total_guarded_routes,
            average_occupancy,
            overall_route_details: OverallRouteDetails { total_distance: total_distance_km, total_duration: total_duration_s },
            total_swapped_routes,
            routes: summaries,
            unrouted_employees,
        }
    }
}
