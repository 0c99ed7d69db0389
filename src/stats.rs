use crate::args::Args;
use crate::client::{ConnectionParams, JellyfinClient};
use crate::collect;
use crate::error::Result;
use crate::models::*;
use crate::perfdata::PerfData;
use crate::status::Report;
use chrono::NaiveDateTime;

pub const OK_MESSAGE: &str = "Jellyfin stats collected";

/// Session counts derived from `/Sessions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub transcode: usize,
    pub direct_play: usize,
    pub direct_stream: usize,
}

impl SessionSummary {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let active = sessions.iter().filter(|s| s.active).count();
        let with_method =
            |m: PlayMethod| sessions.iter().filter(|s| s.play_method.as_ref() == Some(&m)).count();

        Self {
            total: sessions.len(),
            active,
            inactive: sessions.len() - active,
            transcode: with_method(PlayMethod::Transcode),
            direct_play: with_method(PlayMethod::DirectPlay),
            direct_stream: with_method(PlayMethod::DirectStream),
        }
    }
}

/// Run every API call in order and collect the performance data.
/// The first failing call aborts the whole collection.
pub async fn get_stats(client: &JellyfinClient, now: NaiveDateTime) -> Result<PerfData> {
    let mut perf = PerfData::new();

    let response_time = collect::system_info_latency(client).await?;

    let counts = collect::item_counts(client).await?;
    perf.add("movie_count", counts.movies);
    perf.add("shows_count", counts.shows);
    perf.add("episodes_count", counts.episodes);

    let sessions = collect::sessions(client).await?;
    let summary = SessionSummary::from_sessions(&sessions);
    perf.add("session_total", summary.total);
    perf.add("session_active", summary.active);
    perf.add("session_inactive", summary.inactive);
    perf.add("transcode_sessions", summary.transcode);
    perf.add("directplay_sessions", summary.direct_play);
    perf.add("directstream_sessions", summary.direct_stream);

    perf.add("response_time", response_time.as_secs_f64());

    let users = collect::users(client).await?;
    perf.add("user_count", users.len());

    if let Some(play_time) = collect::hourly_play_time(client, now).await? {
        perf.add("current_hour_playtime", play_time);
    }

    for window in WINDOWS {
        add_usage_perfdata(client, &mut perf, window).await?;
    }

    tracing::info!(
        "Collected {} metrics ({} sessions, {} users)",
        perf.len(),
        summary.total,
        users.len()
    );
    Ok(perf)
}

/// One round of user, device and platform breakdowns for `window`.
async fn add_usage_perfdata(
    client: &JellyfinClient,
    perf: &mut PerfData,
    window: Window,
) -> Result<()> {
    for breakdown in Breakdown::ALL {
        let Some(entries) = collect::duration_by(client, breakdown, window.days).await? else {
            tracing::debug!(
                "No {} breakdown for {}",
                breakdown.metric_key(),
                window.label
            );
            continue;
        };
        for entry in entries {
            perf.add(
                format!(
                    "play_by_{}_{}_{}",
                    breakdown.metric_key(),
                    window.label,
                    entry.label
                ),
                entry.duration,
            );
        }
    }
    Ok(())
}

/// Validate arguments, collect, and turn the outcome into the final report.
pub async fn run(args: &Args, now: NaiveDateTime) -> Report {
    match collect_report(args, now).await {
        Ok(perf) => Report::ok(OK_MESSAGE, perf),
        Err(e) => {
            tracing::error!("Check failed: {}", e);
            Report::from_error(&e)
        }
    }
}

async fn collect_report(args: &Args, now: NaiveDateTime) -> Result<PerfData> {
    let params = ConnectionParams::from_args(args)?;
    let client = JellyfinClient::new(&params)?;
    tracing::debug!("Checking {}", params.base_url());
    get_stats(&client, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use chrono::NaiveDate;
    use clap::Parser;
    use mockito::{Matcher, Mock, ServerGuard};

    fn session(method: Option<PlayMethod>, active: bool) -> Session {
        Session {
            play_method: method,
            client: None,
            device_name: None,
            active,
            item_name: None,
        }
    }

    fn metric_value(perf: &PerfData, name: &str) -> Option<String> {
        perf.iter()
            .find(|m| m.name == name)
            .map(|m| m.value.clone())
    }

    // 2024-01-17 is a Wednesday.
    fn wednesday_at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(hour, 5, 0)
            .unwrap()
    }

    fn args_for(server: &ServerGuard) -> Args {
        let addr = server.socket_address();
        Args::try_parse_from([
            "check_jellyfin".to_string(),
            "-H".to_string(),
            addr.ip().to_string(),
            "-p".to_string(),
            addr.port().to_string(),
            "-k".to_string(),
            "secret".to_string(),
        ])
        .unwrap()
    }

    async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
        server
            .mock("GET", path)
            .match_header("x-emby-token", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    async fn mock_breakdown(
        server: &mut ServerGuard,
        group_by: &str,
        days: u32,
        body: &str,
    ) -> Mock {
        server
            .mock(
                "GET",
                Matcher::Regex(format!(
                    r"^/emby/user_usage_stats/{}/BreakDownReport",
                    group_by
                )),
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("days".into(), days.to_string()),
                Matcher::UrlEncoded("filter".into(), "Movie,Episode".into()),
            ]))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    /// A server answering every endpoint; breakdowns are populated only for "today".
    async fn full_server() -> (ServerGuard, Vec<Mock>) {
        let mut server = mockito::Server::new_async().await;
        let mut mocks = vec![
            mock_json(&mut server, "/emby/System/Info", r#"{"Version":"10.9.0"}"#).await,
            mock_json(
                &mut server,
                "/emby/Items/Counts",
                r#"{"MovieCount":120,"SeriesCount":14,"EpisodeCount":600,"BoxSetCount":3}"#,
            )
            .await,
            mock_json(
                &mut server,
                "/emby/Sessions",
                r#"[
                    {"PlayState":{"PlayMethod":"Transcode"},"Client":"Android","DeviceName":"Pixel","NowPlayingItem":{"OriginalTitle":"Alien"}},
                    {"PlayState":{"PlayMethod":"DirectPlay"},"Client":"Kodi","DeviceName":"Living Room","NowPlayingItem":{"OriginalTitle":"Heat"}},
                    {"PlayState":{},"Client":"Jellyfin Web","DeviceName":"Firefox"}
                ]"#,
            )
            .await,
            mock_json(&mut server, "/emby/Users", r#"[{"Name":"alice"},{"Name":"bob"}]"#).await,
        ];
        mocks.push(
            server
                .mock(
                    "GET",
                    Matcher::Regex(r"^/emby/user_usage_stats/HourlyReport".to_string()),
                )
                .with_status(200)
                .with_body(r#"{"3-14":900}"#)
                .create_async()
                .await,
        );

        mocks.push(
            mock_breakdown(
                &mut server,
                "UserId",
                1,
                r#"[{"label":"alice@tv","time":120},{"label":"bob","time":60}]"#,
            )
            .await,
        );
        mocks.push(
            mock_breakdown(
                &mut server,
                "DeviceName",
                1,
                r#"[{"label":"Living Room","time":180}]"#,
            )
            .await,
        );
        mocks.push(
            mock_breakdown(&mut server, "ClientName", 1, r#"[{"label":"Kodi","time":180}]"#)
                .await,
        );
        for days in [7, 365] {
            for group_by in ["UserId", "DeviceName", "ClientName"] {
                mocks.push(mock_breakdown(&mut server, group_by, days, "[]").await);
            }
        }

        (server, mocks)
    }

    #[test]
    fn session_summary_counts() {
        let sessions = vec![
            session(Some(PlayMethod::Transcode), true),
            session(Some(PlayMethod::DirectPlay), true),
            session(Some(PlayMethod::DirectStream), false),
            session(Some(PlayMethod::Other("Remux".to_string())), true),
            session(None, false),
        ];
        let summary = SessionSummary::from_sessions(&sessions);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.inactive, 2);
        assert_eq!(summary.active + summary.inactive, summary.total);
        assert_eq!(summary.transcode, 1);
        assert_eq!(summary.direct_play, 1);
        assert_eq!(summary.direct_stream, 1);
        assert!(summary.transcode + summary.direct_play + summary.direct_stream <= summary.total);
    }

    #[test]
    fn session_summary_empty() {
        assert_eq!(SessionSummary::from_sessions(&[]), SessionSummary::default());
    }

    #[tokio::test]
    async fn full_run_reports_ok() {
        let (server, mocks) = full_server().await;

        let report = run(&args_for(&server), wednesday_at(14)).await;
        assert_eq!(report.status, Status::Ok);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.message, OK_MESSAGE);

        let perf = &report.perfdata;
        let value = |name: &str| metric_value(perf, name);
        assert_eq!(value("movie_count").as_deref(), Some("120"));
        assert_eq!(value("shows_count").as_deref(), Some("14"));
        assert_eq!(value("episodes_count").as_deref(), Some("600"));
        assert_eq!(value("session_total").as_deref(), Some("3"));
        assert_eq!(value("session_active").as_deref(), Some("2"));
        assert_eq!(value("session_inactive").as_deref(), Some("1"));
        assert_eq!(value("transcode_sessions").as_deref(), Some("1"));
        assert_eq!(value("directplay_sessions").as_deref(), Some("1"));
        assert_eq!(value("directstream_sessions").as_deref(), Some("0"));
        assert!(value("response_time").is_some());
        assert_eq!(value("user_count").as_deref(), Some("2"));
        assert_eq!(value("current_hour_playtime").as_deref(), Some("900"));
        assert_eq!(value("play_by_user_today_alice").as_deref(), Some("120"));
        assert_eq!(value("play_by_user_today_bob").as_deref(), Some("60"));
        assert_eq!(
            value("play_by_device_today_Living_Room").as_deref(),
            Some("180")
        );
        assert_eq!(value("play_by_platform_today_Kodi").as_deref(), Some("180"));
        assert!(perf.iter().all(|m| !m.name.contains("_week_")));
        assert!(perf.iter().all(|m| !m.name.contains("_year_")));

        let names: Vec<&str> = perf.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            &names[..12],
            &[
                "movie_count",
                "shows_count",
                "episodes_count",
                "session_total",
                "session_active",
                "session_inactive",
                "transcode_sessions",
                "directplay_sessions",
                "directstream_sessions",
                "response_time",
                "user_count",
                "current_hour_playtime",
            ]
        );

        let line = report.to_string();
        assert!(line.starts_with("<span style=\"color:#2A9A3D;font-weight: bold;\">[OK]</span>"));
        assert!(line.ends_with("\"play_by_platform_today_Kodi\"=180;;;;"));

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn missing_hour_bucket_is_omitted() {
        let (server, _mocks) = full_server().await;

        let report = run(&args_for(&server), wednesday_at(2)).await;
        assert_eq!(report.status, Status::Ok);
        assert_eq!(metric_value(&report.perfdata, "current_hour_playtime"), None);
    }

    #[tokio::test]
    async fn missing_hostname_is_critical() {
        let args = Args::try_parse_from(["check_jellyfin", "-k", "secret"]).unwrap();
        let report = run(&args, wednesday_at(14)).await;
        assert_eq!(report.exit_code(), 2);
        assert!(report.to_string().contains("Hostname parameter"));
        assert_eq!(report.perfdata.len(), 0);
    }

    #[tokio::test]
    async fn missing_token_is_critical() {
        let args = Args::try_parse_from(["check_jellyfin", "-H", "media.local"]).unwrap();
        let report = run(&args, wednesday_at(14)).await;
        assert_eq!(report.exit_code(), 2);
        assert!(report.to_string().contains("[ERROR]"));
        assert!(report.to_string().contains("Token parameter"));
    }

    #[tokio::test]
    async fn failing_call_discards_metrics() {
        let mut server = mockito::Server::new_async().await;
        let _info = mock_json(&mut server, "/emby/System/Info", "{}").await;
        let _counts = mock_json(&mut server, "/emby/Items/Counts", r#"{"MovieCount":1}"#).await;
        let _sessions = server
            .mock("GET", "/emby/Sessions")
            .with_status(500)
            .create_async()
            .await;

        let report = run(&args_for(&server), wednesday_at(14)).await;
        assert_eq!(report.status, Status::Critical);
        assert!(report.message.starts_with("Could not contact jellyfin"));
        assert_eq!(report.perfdata.len(), 0);
        assert!(report.to_string().contains("[CRITICAL]"));
    }
}
