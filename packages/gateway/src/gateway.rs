//! The Urban API façade.

use std::sync::Arc;

use urbanomy_gateway_models::{
    Crs, FunctionalZones, IndicatorValues, ScenarioSummary, SourceDescriptor, Territory,
};

use crate::selection::select_by_priority;
use crate::zones::{extract_features, normalize_features};
use crate::{GatewayError, ReqwestUrbanApiHandler, UrbanApiConfig, UrbanApiHandler};

/// Stateless client for the Urban API endpoints the planning app uses.
///
/// Cloning is cheap; clones share the underlying handler.
#[derive(Clone)]
pub struct UrbanApiGateway {
    handler: Arc<dyn UrbanApiHandler>,
}

impl UrbanApiGateway {
    /// Creates a gateway over an arbitrary handler.
    #[must_use]
    pub fn new(handler: Arc<dyn UrbanApiHandler>) -> Self {
        Self { handler }
    }

    /// Creates a gateway that talks HTTP to `config.base_url`.
    #[must_use]
    pub fn from_config(config: &UrbanApiConfig) -> Self {
        Self::new(Arc::new(ReqwestUrbanApiHandler::new(config)))
    }

    /// GETs `endpoint`, turning any failure into a [`GatewayError::NotFound`]
    /// with the given message and identifier.
    async fn fetch_or_not_found(
        &self,
        endpoint: &str,
        message: &str,
        identifier: impl std::fmt::Display + Send,
    ) -> Result<serde_json::Value, GatewayError> {
        self.handler.get(endpoint).await.map_err(|e| {
            log::warn!("Urban API request {endpoint} failed: {e}");
            GatewayError::not_found(message, identifier)
        })
    }

    /// Returns the functional zone source to use for a scenario.
    ///
    /// With a non-empty `source`, returns the first record carrying exactly
    /// that label. Otherwise a lone record is returned as-is, and several
    /// are narrowed down with [`select_by_priority`]; records that fail to
    /// parse are skipped first.
    ///
    /// [`select_by_priority`]: crate::selection::select_by_priority
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the scenario has no sources,
    /// the requested source is absent, or no usable source can be chosen.
    pub async fn get_functional_zone_sources(
        &self,
        scenario_id: i64,
        source: Option<&str>,
    ) -> Result<SourceDescriptor, GatewayError> {
        const NO_SOURCES: &str = "No functional zone sources found for scenario_id";

        let endpoint = format!("/api/v1/scenarios/{scenario_id}/functional_zone_sources");
        let response = self
            .fetch_or_not_found(&endpoint, NO_SOURCES, scenario_id)
            .await?;

        let records = response
            .as_array()
            .filter(|records| !records.is_empty())
            .ok_or_else(|| GatewayError::not_found(NO_SOURCES, scenario_id))?;

        if let Some(source) = source.filter(|s| !s.is_empty()) {
            let record = records
                .iter()
                .find(|r| r.get("source").and_then(serde_json::Value::as_str) == Some(source))
                .ok_or_else(|| {
                    GatewayError::not_found("No data found for the specified source", source)
                })?;
            return parse_source(record, scenario_id);
        }

        if let [only] = records.as_slice() {
            return parse_source(only, scenario_id);
        }

        let candidates: Vec<SourceDescriptor> = records
            .iter()
            .filter_map(|r| match serde_json::from_value(r.clone()) {
                Ok(desc) => Some(desc),
                Err(e) => {
                    log::warn!("Ignoring malformed source record for scenario {scenario_id}: {e}");
                    None
                }
            })
            .collect();

        let best = select_by_priority(&candidates, scenario_id)?.clone();
        log::debug!(
            "Scenario {scenario_id}: selected source {} ({}) out of {}",
            best.source,
            best.year,
            candidates.len()
        );
        Ok(best)
    }

    /// Fetches the functional zones of a scenario.
    ///
    /// `is_context` marks requests made for the context (surroundings) of a
    /// project; the Urban API serves both from the same endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no source can be resolved or the
    /// API returns no zones.
    pub async fn get_functional_zones(
        &self,
        scenario_id: i64,
        is_context: bool,
        source: Option<&str>,
    ) -> Result<FunctionalZones, GatewayError> {
        const NO_ZONES: &str = "No functional zones found for the given scenario ID";

        let source = self.get_functional_zone_sources(scenario_id, source).await?;
        log::debug!(
            "Fetching functional zones for scenario {scenario_id} (context: {is_context}) from {} {}",
            source.source,
            source.year
        );

        let endpoint = format!(
            "/api/v1/scenarios/{scenario_id}/functional_zones?year={}&source={}",
            source.year, source.source
        );
        let response = self
            .fetch_or_not_found(&endpoint, NO_ZONES, scenario_id)
            .await?;

        let features = extract_features(&response);
        if features.is_empty() {
            return Err(GatewayError::not_found(NO_ZONES, scenario_id));
        }

        let zones = normalize_features(features);
        if zones.is_empty() {
            return Err(GatewayError::not_found(NO_ZONES, scenario_id));
        }

        log::info!(
            "Functional zones fetched: {} zones for scenario {scenario_id}",
            zones.len()
        );

        Ok(FunctionalZones {
            source,
            crs: Crs::WGS84,
            zones,
        })
    }

    /// Resolves the scenario record to its project.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the scenario cannot be fetched
    /// or carries no integer `project.project_id`.
    pub async fn get_scenario(&self, scenario_id: i64) -> Result<ScenarioSummary, GatewayError> {
        const NO_PROJECT: &str = "Project ID is missing in scenario data.";

        let endpoint = format!("/api/v1/scenarios/{scenario_id}");
        let response = self
            .fetch_or_not_found(&endpoint, NO_PROJECT, scenario_id)
            .await?;

        let project_id = response
            .get("project")
            .and_then(|p| p.get("project_id"))
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| GatewayError::not_found(NO_PROJECT, scenario_id))?;

        Ok(ScenarioSummary {
            scenario_id,
            project_id,
        })
    }

    /// Returns the id of the project a scenario belongs to.
    ///
    /// # Errors
    ///
    /// See [`Self::get_scenario`].
    pub async fn get_project_id(&self, scenario_id: i64) -> Result<i64, GatewayError> {
        Ok(self.get_scenario(scenario_id).await?.project_id)
    }

    /// Fetches the project territory of a scenario, reprojected into the
    /// UTM zone that covers it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the project or its territory
    /// cannot be fetched or has no geometry, and
    /// [`GatewayError::Geometry`] if the geometry cannot be reprojected.
    pub async fn get_territory(&self, scenario_id: i64) -> Result<Territory, GatewayError> {
        const NO_TERRITORY: &str = "No territory found for the given scenario ID";

        let project_id = self.get_project_id(scenario_id).await?;
        let endpoint = format!("/api/v1/projects/{project_id}/territory");
        let response = self
            .fetch_or_not_found(&endpoint, NO_TERRITORY, scenario_id)
            .await?;

        let geometry = response
            .get("geometry")
            .filter(|g| !g.is_null())
            .ok_or_else(|| GatewayError::not_found(NO_TERRITORY, scenario_id))?;
        let geometry = urbanomy_projection::parse_geometry(geometry).map_err(|e| {
            log::warn!("Territory of project {project_id} has an invalid geometry: {e}");
            GatewayError::not_found(NO_TERRITORY, scenario_id)
        })?;

        let (crs, geometry) = urbanomy_projection::to_estimated_utm(&geometry)?;
        log::info!("Territory of project {project_id} loaded in {crs}");

        Ok(Territory {
            project_id,
            crs,
            geometry,
        })
    }

    /// Fetches the indicator values of a scenario verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the request fails.
    pub async fn get_indicator_values(
        &self,
        scenario_id: i64,
    ) -> Result<IndicatorValues, GatewayError> {
        let endpoint = format!("/api/v1/scenarios/{scenario_id}/indicators_values");
        let response = self
            .fetch_or_not_found(
                &endpoint,
                "No indicators values found for the given scenario ID",
                scenario_id,
            )
            .await?;
        Ok(IndicatorValues(response))
    }
}

fn parse_source(
    record: &serde_json::Value,
    scenario_id: i64,
) -> Result<SourceDescriptor, GatewayError> {
    serde_json::from_value(record.clone()).map_err(|e| {
        log::warn!("Malformed source record for scenario {scenario_id}: {e}");
        GatewayError::not_found("No valid source found for the given scenario ID", scenario_id)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use geo::Area;

    use super::*;

    /// Serves canned JSON per endpoint and records every request.
    #[derive(Default)]
    struct FakeUrbanApi {
        responses: BTreeMap<String, serde_json::Value>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeUrbanApi {
        fn with(mut self, endpoint: &str, body: serde_json::Value) -> Self {
            self.responses.insert(endpoint.to_string(), body);
            self
        }
    }

    #[async_trait::async_trait]
    impl UrbanApiHandler for FakeUrbanApi {
        async fn get(&self, endpoint: &str) -> Result<serde_json::Value, GatewayError> {
            self.requests.lock().unwrap().push(endpoint.to_string());
            self.responses
                .get(endpoint)
                .cloned()
                .ok_or_else(|| GatewayError::Status {
                    status: 404,
                    endpoint: endpoint.to_string(),
                })
        }
    }

    fn gateway(api: FakeUrbanApi) -> (UrbanApiGateway, Arc<FakeUrbanApi>) {
        let api = Arc::new(api);
        (UrbanApiGateway::new(api.clone()), api)
    }

    fn sources_body() -> serde_json::Value {
        serde_json::json!([
            { "source": "OSM", "year": 2020 },
            { "source": "OSM", "year": 2022 },
            { "source": "User", "year": 2019 },
        ])
    }

    fn not_found_parts(err: GatewayError) -> (String, String) {
        match err {
            GatewayError::NotFound {
                message,
                identifier,
            } => (message, identifier),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    fn zone_feature(zone_type: i64, landuse: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[30.3, 59.9], [30.31, 59.9], [30.31, 59.91], [30.3, 59.9]]],
            },
            "properties": {
                "functional_zone_id": 1,
                "functional_zone_type": { "id": zone_type, "name": "residential" },
                "properties": { "landuse_zon": landuse },
                "year": 2022,
                "source": "OSM",
            },
        })
    }

    #[tokio::test]
    async fn selects_best_source_automatically() {
        let (gw, _) = gateway(
            FakeUrbanApi::default().with("/api/v1/scenarios/1/functional_zone_sources", sources_body()),
        );

        let source = gw.get_functional_zone_sources(1, None).await.unwrap();
        assert_eq!(source, SourceDescriptor::new("OSM", 2022));
    }

    #[tokio::test]
    async fn explicit_source_is_matched_exactly() {
        let (gw, _) = gateway(
            FakeUrbanApi::default().with("/api/v1/scenarios/1/functional_zone_sources", sources_body()),
        );

        let source = gw.get_functional_zone_sources(1, Some("User")).await.unwrap();
        assert_eq!(source, SourceDescriptor::new("User", 2019));
    }

    #[tokio::test]
    async fn explicit_source_missing_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/1/functional_zone_sources",
            serde_json::json!([{ "source": "PZZ", "year": 2021 }, { "source": "User", "year": 2023 }]),
        ));

        let err = gw
            .get_functional_zone_sources(1, Some("OSM"))
            .await
            .unwrap_err();
        match err {
            GatewayError::NotFound {
                message,
                identifier,
            } => {
                assert_eq!(message, "No data found for the specified source");
                assert_eq!(identifier, "OSM");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_source_list_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/3/functional_zone_sources",
            serde_json::json!([]),
        ));

        let err = gw.get_functional_zone_sources(3, None).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn empty_explicit_source_selects_automatically() {
        let (gw, _) = gateway(
            FakeUrbanApi::default().with("/api/v1/scenarios/1/functional_zone_sources", sources_body()),
        );

        let source = gw.get_functional_zone_sources(1, Some("")).await.unwrap();
        assert_eq!(source, SourceDescriptor::new("OSM", 2022));
    }

    #[tokio::test]
    async fn explicit_source_without_valid_year_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/4/functional_zone_sources",
            serde_json::json!([{ "source": "OSM", "year": "2022" }, { "source": "User", "year": 2019 }]),
        ));

        let err = gw
            .get_functional_zone_sources(4, Some("OSM"))
            .await
            .unwrap_err();
        assert_eq!(
            not_found_parts(err),
            (
                "No valid source found for the given scenario ID".to_string(),
                "4".to_string()
            )
        );
    }

    #[tokio::test]
    async fn malformed_records_are_skipped_automatically() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/6/functional_zone_sources",
            serde_json::json!([
                { "source": "OSM" },
                { "source": "PZZ", "year": 2021 },
                { "source": "User", "year": 2023 },
            ]),
        ));

        let source = gw.get_functional_zone_sources(6, None).await.unwrap();
        assert_eq!(source, SourceDescriptor::new("PZZ", 2021));
    }

    #[tokio::test]
    async fn lone_malformed_record_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/6/functional_zone_sources",
            serde_json::json!([{ "source": "OSM", "year": "2022" }]),
        ));

        let err = gw.get_functional_zone_sources(6, None).await.unwrap_err();
        let (message, identifier) = not_found_parts(err);
        assert_eq!(message, "No valid source found for the given scenario ID");
        assert_eq!(identifier, "6");
    }

    #[tokio::test]
    async fn lone_unknown_label_is_returned_unchanged() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/6/functional_zone_sources",
            serde_json::json!([{ "source": "Cadastre", "year": 2020 }]),
        ));

        let source = gw.get_functional_zone_sources(6, None).await.unwrap();
        assert_eq!(source, SourceDescriptor::new("Cadastre", 2020));
    }

    #[tokio::test]
    async fn unknown_label_left_after_skipping_is_not_returned() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/6/functional_zone_sources",
            serde_json::json!([
                { "source": "OSM", "year": null },
                { "source": "Cadastre", "year": 2020 },
            ]),
        ));

        let err = gw.get_functional_zone_sources(6, None).await.unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
    }

    #[tokio::test]
    async fn fetches_and_normalizes_zones() {
        let (gw, api) = gateway(
            FakeUrbanApi::default()
                .with("/api/v1/scenarios/1/functional_zone_sources", sources_body())
                .with(
                    "/api/v1/scenarios/1/functional_zones?year=2022&source=OSM",
                    serde_json::json!({
                        "type": "FeatureCollection",
                        "features": [zone_feature(14, None), zone_feature(4, Some("Industrial"))],
                    }),
                ),
        );

        let zones = gw.get_functional_zones(1, false, None).await.unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.crs, Crs::WGS84);
        assert_eq!(zones.source.year, 2022);

        assert_eq!(zones.zones[0].landuse_zone, "Residential");
        assert_eq!(zones.zones[0].zone_type_id, Some(1));
        assert_eq!(zones.zones[1].landuse_zone, "Industrial");
        assert_eq!(zones.zones[1].zone_type_id, Some(4));

        let requests = api.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            [
                "/api/v1/scenarios/1/functional_zone_sources",
                "/api/v1/scenarios/1/functional_zones?year=2022&source=OSM",
            ]
        );
    }

    #[tokio::test]
    async fn zero_zone_features_is_not_found() {
        let (gw, _) = gateway(
            FakeUrbanApi::default()
                .with(
                    "/api/v1/scenarios/2/functional_zone_sources",
                    serde_json::json!([{ "source": "PZZ", "year": 2021 }]),
                )
                .with(
                    "/api/v1/scenarios/2/functional_zones?year=2021&source=PZZ",
                    serde_json::json!({ "type": "FeatureCollection", "features": [] }),
                ),
        );

        let err = gw.get_functional_zones(2, true, None).await.unwrap_err();
        match err {
            GatewayError::NotFound { identifier, .. } => assert_eq!(identifier, "2"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_project_id() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/5",
            serde_json::json!({ "scenario_id": 5, "project": { "project_id": 77, "name": "P" } }),
        ));

        assert_eq!(gw.get_project_id(5).await.unwrap(), 77);
    }

    #[tokio::test]
    async fn missing_project_id_is_not_found() {
        let (gw, _) = gateway(
            FakeUrbanApi::default().with("/api/v1/scenarios/5", serde_json::json!({ "project": null })),
        );

        let err = gw.get_project_id(5).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Project ID is missing"));
    }

    #[tokio::test]
    async fn territory_is_reprojected_to_utm() {
        let (gw, api) = gateway(
            FakeUrbanApi::default()
                .with(
                    "/api/v1/scenarios/5",
                    serde_json::json!({ "project": { "project_id": 77 } }),
                )
                .with(
                    "/api/v1/projects/77/territory",
                    serde_json::json!({
                        "project_id": 77,
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [[
                                [30.30, 59.93],
                                [30.31, 59.93],
                                [30.31, 59.94],
                                [30.30, 59.94],
                                [30.30, 59.93],
                            ]],
                        },
                    }),
                ),
        );

        let territory = gw.get_territory(5).await.unwrap();
        assert_eq!(territory.project_id, 77);
        assert_eq!(territory.crs, Crs::utm(36, true));
        assert_eq!(territory.crs.linear_unit(), Some("metre"));

        let area = territory.area_sq_m().unwrap();
        assert!(area > 550_000.0 && area < 700_000.0, "area was {area}");
        assert!((territory.geometry.unsigned_area() - area).abs() < f64::EPSILON);

        assert_eq!(territory.to_feature_collection().features.len(), 1);
        assert_eq!(api.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn territory_request_failure_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default().with(
            "/api/v1/scenarios/5",
            serde_json::json!({ "project": { "project_id": 77 } }),
        ));

        let err = gw.get_territory(5).await.unwrap_err();
        match err {
            GatewayError::NotFound {
                message,
                identifier,
            } => {
                assert_eq!(message, "No territory found for the given scenario ID");
                assert_eq!(identifier, "5");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    fn territory_api(territory: serde_json::Value) -> FakeUrbanApi {
        FakeUrbanApi::default()
            .with(
                "/api/v1/scenarios/5",
                serde_json::json!({ "project": { "project_id": 77 } }),
            )
            .with("/api/v1/projects/77/territory", territory)
    }

    async fn assert_no_territory(territory: serde_json::Value) {
        let (gw, _) = gateway(territory_api(territory));

        let err = gw.get_territory(5).await.unwrap_err();
        assert_eq!(
            not_found_parts(err),
            (
                "No territory found for the given scenario ID".to_string(),
                "5".to_string()
            )
        );
    }

    #[tokio::test]
    async fn territory_without_geometry_is_not_found() {
        assert_no_territory(serde_json::json!({ "project_id": 77 })).await;
    }

    #[tokio::test]
    async fn territory_with_null_geometry_is_not_found() {
        assert_no_territory(serde_json::json!({ "project_id": 77, "geometry": null })).await;
    }

    #[tokio::test]
    async fn territory_with_unparsable_geometry_is_not_found() {
        assert_no_territory(serde_json::json!({
            "project_id": 77,
            "geometry": { "type": "Blob", "coordinates": [1, 2] },
        }))
        .await;
    }

    #[tokio::test]
    async fn indicator_values_pass_through() {
        let body = serde_json::json!([{ "indicator": { "id": 1 }, "value": 0.42 }]);
        let (gw, _) = gateway(
            FakeUrbanApi::default().with("/api/v1/scenarios/9/indicators_values", body.clone()),
        );

        assert_eq!(gw.get_indicator_values(9).await.unwrap(), IndicatorValues(body));
    }

    #[tokio::test]
    async fn indicator_request_failure_is_not_found() {
        let (gw, _) = gateway(FakeUrbanApi::default());

        let err = gw.get_indicator_values(9).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.to_string(),
            "No indicators values found for the given scenario ID: 9"
        );
    }
}
