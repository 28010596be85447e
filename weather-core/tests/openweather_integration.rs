//! Integration tests for the OpenWeather client and the session using wiremock.

use chrono::Locale;
use weather_core::{
    CityName, DisplayZone, FileStore, KeyValueStore, LabelPolicy, Phase, WeatherError,
    WeatherProvider, WeatherSession, provider::openweather::OpenWeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "dt": 1_700_000_000,
        "main": { "temp": 18.6, "feels_like": 18.0, "humidity": 55 },
        "weather": [{ "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "wind": { "speed": 4.2 }
    })
}

fn forecast_entry(dt: i64, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": { "temp": temp, "humidity": 70 },
        "weather": [{ "main": "Rain", "description": "light rain", "icon": "10n" }],
        "wind": { "speed": 2.0 },
        "dt_txt": "ignored"
    })
}

fn city(name: &str) -> CityName {
    CityName::new(name).unwrap()
}

fn utc_labels() -> LabelPolicy {
    LabelPolicy::new(DisplayZone::Named(chrono_tz::UTC), Locale::en_US)
}

#[tokio::test]
async fn test_current_sends_metric_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Zurich"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Zurich")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("KEY".into(), mock_server.uri());
    let sample = provider.get_current(&city("Zurich")).await.unwrap();

    assert_eq!(sample.location_name, "Zurich");
    assert_eq!(sample.humidity_pct, 55);
    assert_eq!(sample.condition_main, "Clouds");
    assert_eq!(sample.condition_description, "broken clouds");
    assert_eq!(sample.icon_id, "04d");
}

#[tokio::test]
async fn test_current_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404", "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("KEY".into(), mock_server.uri());
    let err = provider.get_current(&city("Atlantis")).await.unwrap_err();

    assert_eq!(err, WeatherError::NotFound);
}

#[tokio::test]
async fn test_unauthorized_is_upstream_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&mock_server)
        .await;

    let provider = OpenWeatherProvider::with_base_url(String::new(), mock_server.uri());
    let err = provider.get_current(&city("Paris")).await.unwrap_err();

    assert_eq!(err, WeatherError::Upstream { status: 401 });
}

#[tokio::test]
async fn test_malformed_body_is_parse_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("KEY".into(), mock_server.uri());
    let err = provider.get_forecast(&city("Paris")).await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(ref msg) if msg.contains("forecast")), "{err:?}");
}

#[tokio::test]
async fn test_forecast_preserves_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": { "name": "Bern", "country": "CH" },
            "list": [forecast_entry(100, 1.0), forecast_entry(200, 2.0), forecast_entry(300, 3.0)]
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenWeatherProvider::with_base_url("KEY".into(), mock_server.uri());
    let samples = provider.get_forecast(&city("Bern")).await.unwrap();

    let stamps: Vec<i64> = samples.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![100, 200, 300]);
    assert_eq!(samples[0].condition_description, "light rain");
}

#[tokio::test]
async fn test_session_end_to_end_with_file_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Bern"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Bern")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Bernn"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    // 1970-01-01 00:00 UTC is a Thursday.
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [
                forecast_entry(0, 1.0),
                forecast_entry(10_800, 2.0),
                forecast_entry(86_400, 3.0),
            ]
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("store.json");

    let provider = OpenWeatherProvider::with_base_url("KEY".into(), mock_server.uri());
    let mut session = WeatherSession::new(provider, FileStore::new(&store_path), utc_labels());

    session.submit("Bern").await;
    session.watch_forecast_city(Some(city("Bern"))).await;

    assert_eq!(session.current().phase(), Phase::Success);
    let groups = session.forecast().data().unwrap();
    assert_eq!(groups.labels(), vec!["Thu", "Fri"]);
    assert_eq!(groups.get("Thu").unwrap().len(), 2);

    session.submit("Bernn").await;
    assert_eq!(
        session.current().error(),
        Some("City not found. Please check the spelling and try again.")
    );
    assert!(session.current().data().is_none());

    let persisted = FileStore::new(&store_path).get("searchHistory").unwrap();
    assert_eq!(persisted.as_deref(), Some(r#"["Bern"]"#));
}
