use std::time::Instant;

use chrono::{Duration, Utc};
use savora_core::config::{AppConfig, LoadOptions};
use savora_core::{RecommendationEngine, ShopperProfile, SimilarityEngine, TrendingAggregator};
use savora_db::repositories::{
    CatalogRepository, FavoriteRepository, OrderHistoryRepository, PreferenceRepository,
    SqlCatalogRepository, SqlFavoriteRepository, SqlOrderHistoryRepository,
    SqlPreferenceRepository,
};
use savora_db::{connect_with_settings, migrations, StorefrontSeedDataset};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.push(skipped("db_connectivity"));
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("ranking_surfaces"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(SmokeCheck {
                name: "db_connectivity",
                status: SmokeStatus::Fail,
                elapsed_ms: 0,
                message: format!("failed to initialize async runtime: {error}"),
            });
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("ranking_surfaces"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let db_started = Instant::now();
    let db_result = runtime.block_on(async {
        connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
    });

    let pool = match db_result {
        Ok(pool) => {
            checks.push(SmokeCheck {
                name: "db_connectivity",
                status: SmokeStatus::Pass,
                elapsed_ms: db_started.elapsed().as_millis() as u64,
                message: format!("connected using `{}`", config.database.url),
            });
            pool
        }
        Err(error) => {
            checks.push(SmokeCheck {
                name: "db_connectivity",
                status: SmokeStatus::Fail,
                elapsed_ms: db_started.elapsed().as_millis() as u64,
                message: format!("failed to connect: {error}"),
            });
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("ranking_surfaces"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let migration_started = Instant::now();
    let migration_result = runtime.block_on(async { migrations::run_pending(&pool).await });

    match migration_result {
        Ok(()) => checks.push(SmokeCheck {
            name: "migration_visibility",
            status: SmokeStatus::Pass,
            elapsed_ms: migration_started.elapsed().as_millis() as u64,
            message: "migrations are visible and executable".to_string(),
        }),
        Err(error) => {
            checks.push(SmokeCheck {
                name: "migration_visibility",
                status: SmokeStatus::Fail,
                elapsed_ms: migration_started.elapsed().as_millis() as u64,
                message: format!("migration execution failed: {error}"),
            });
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("ranking_surfaces"));
            runtime.block_on(async { pool.close().await });
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    }

    let seed_started = Instant::now();
    let seed_result = runtime.block_on(async {
        let seeded = StorefrontSeedDataset::load(&pool).await.map_err(|e| e.to_string())?;
        let verification =
            StorefrontSeedDataset::verify(&pool).await.map_err(|e| e.to_string())?;
        if !verification.all_present {
            return Err("seed verification reported missing rows".to_string());
        }
        Ok::<&'static str, String>(seeded.seed_user_id)
    });

    let seed_user_id = match seed_result {
        Ok(seed_user_id) => {
            checks.push(SmokeCheck {
                name: "seed_dataset",
                status: SmokeStatus::Pass,
                elapsed_ms: seed_started.elapsed().as_millis() as u64,
                message: "storefront seed dataset loaded and verified".to_string(),
            });
            seed_user_id
        }
        Err(error) => {
            checks.push(SmokeCheck {
                name: "seed_dataset",
                status: SmokeStatus::Fail,
                elapsed_ms: seed_started.elapsed().as_millis() as u64,
                message: error,
            });
            checks.push(skipped("ranking_surfaces"));
            runtime.block_on(async { pool.close().await });
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let ranking_started = Instant::now();
    let ranking_result =
        runtime.block_on(async { exercise_ranking_surfaces(&pool, seed_user_id).await });
    checks.push(match ranking_result {
        Ok(message) => SmokeCheck {
            name: "ranking_surfaces",
            status: SmokeStatus::Pass,
            elapsed_ms: ranking_started.elapsed().as_millis() as u64,
            message,
        },
        Err(error) => SmokeCheck {
            name: "ranking_surfaces",
            status: SmokeStatus::Fail,
            elapsed_ms: ranking_started.elapsed().as_millis() as u64,
            message: error,
        },
    });

    runtime.block_on(async {
        let _ = StorefrontSeedDataset::clean(&pool).await;
        pool.close().await;
    });

    finalize_report(checks, started.elapsed().as_millis() as u64)
}

// Drives the three read surfaces end to end against the seed dataset.
async fn exercise_ranking_surfaces(
    pool: &savora_db::DbPool,
    seed_user_id: &str,
) -> Result<String, String> {
    let catalog_repo = SqlCatalogRepository::new(pool.clone());
    let orders_repo = SqlOrderHistoryRepository::new(pool.clone());
    let favorites_repo = SqlFavoriteRepository::new(pool.clone());
    let preferences_repo = SqlPreferenceRepository::new(pool.clone());

    let catalog = catalog_repo.catalogue_snapshot().await.map_err(|e| e.to_string())?;
    if catalog.is_empty() {
        return Err("catalogue snapshot is empty after seeding".to_string());
    }

    let profile = ShopperProfile {
        order_history: orders_repo
            .history_for_user(seed_user_id)
            .await
            .map_err(|e| e.to_string())?,
        favorites: favorites_repo
            .favorites_for_user(seed_user_id)
            .await
            .map_err(|e| e.to_string())?,
        dietary_preferences: preferences_repo
            .preferences_for_user(seed_user_id)
            .await
            .map_err(|e| e.to_string())?,
    };

    let feed = RecommendationEngine::new().personalized_feed(&catalog, &profile, None);
    if feed.is_empty() {
        return Err(format!("personalized feed for `{seed_user_id}` came back empty"));
    }

    let target = catalog
        .iter()
        .find(|dish| dish.id.0 == "dish-margherita")
        .ok_or_else(|| "seed dish `dish-margherita` missing from catalogue".to_string())?;
    let similar = SimilarityEngine::new().similar_dishes(target, &catalog, None, false);
    if similar.is_empty() {
        return Err("similarity surface returned no candidates".to_string());
    }

    let cutoff = Utc::now() - Duration::days(7);
    let recent = orders_repo.delivered_since(cutoff).await.map_err(|e| e.to_string())?;
    let trending =
        TrendingAggregator::new().trending_dishes(&recent, &catalog, Utc::now(), 7, None);
    if trending.is_empty() {
        return Err("trending surface returned no dishes".to_string());
    }

    Ok(format!(
        "feed={} similar={} trending={} dishes ranked from the seed dataset",
        feed.len(),
        similar.len(),
        trending.len()
    ))
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((started.elapsed().as_millis() as u64, value)),
        Err(error) => Err((started.elapsed().as_millis() as u64, error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
