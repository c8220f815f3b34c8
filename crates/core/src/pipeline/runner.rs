//! The harvest orchestrator.
//!
//! One task per vehicle record, all spawned together and awaited as a set;
//! the governor is closed exactly once after the whole set has finished,
//! regardless of individual task outcomes.

use bytes::Bytes;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info};

use crate::detail::{parse_vehicle, select_preferred_image, VehicleDetail};
use crate::naming::PathDirector;
use crate::net::{NetGovernor, Prompter, Transport};
use crate::records::VehicleRecord;
use crate::storage::ImageStore;

use super::types::{RunSummary, Stage, TaskFailure, TaskOutcome};

/// Drives the per-record download pipeline through the rate governor.
pub struct Harvester<T: Transport, P: Prompter> {
    governor: Arc<NetGovernor<T, P>>,
    store: Arc<ImageStore>,
    director: Arc<PathDirector>,
    link_has_version: bool,
    tag_preference: Arc<Vec<String>>,
}

/// Everything one record task needs, cloned into its spawn.
struct TaskContext<T: Transport, P: Prompter> {
    governor: Arc<NetGovernor<T, P>>,
    store: Arc<ImageStore>,
    director: Arc<PathDirector>,
    link_has_version: bool,
    tag_preference: Arc<Vec<String>>,
}

impl<T: Transport, P: Prompter> Clone for TaskContext<T, P> {
    fn clone(&self) -> Self {
        Self {
            governor: Arc::clone(&self.governor),
            store: Arc::clone(&self.store),
            director: Arc::clone(&self.director),
            link_has_version: self.link_has_version,
            tag_preference: Arc::clone(&self.tag_preference),
        }
    }
}

impl<T: Transport, P: Prompter> Harvester<T, P> {
    pub fn new(
        governor: NetGovernor<T, P>,
        store: ImageStore,
        director: PathDirector,
        link_has_version: bool,
        tag_preference: Vec<String>,
    ) -> Self {
        Self {
            governor: Arc::new(governor),
            store: Arc::new(store),
            director: Arc::new(director),
            link_has_version,
            tag_preference: Arc::new(tag_preference),
        }
    }

    /// Runs the pipeline over all records and returns the totals.
    ///
    /// Tasks run concurrently with no ordering guarantee; failures stay
    /// inside their task and end up in the summary's failure list.
    pub async fn run(&self, records: Vec<VehicleRecord>) -> RunSummary {
        let start = Instant::now();

        let tasks: Vec<_> = records
            .into_iter()
            .map(|record| {
                let ctx = TaskContext {
                    governor: Arc::clone(&self.governor),
                    store: Arc::clone(&self.store),
                    director: Arc::clone(&self.director),
                    link_has_version: self.link_has_version,
                    tag_preference: Arc::clone(&self.tag_preference),
                };
                tokio::spawn(harvest_one(ctx, record))
            })
            .collect();

        let outcomes = futures::future::join_all(tasks).await;

        // The set is fully drained; release the shared client exactly once.
        self.governor.close().await;

        let mut summary = RunSummary::default();
        for joined in outcomes {
            match joined {
                Ok(outcome) => summary.absorb(outcome),
                Err(e) => error!("Vehicle task aborted: {}", e),
            }
        }
        summary.elapsed = start.elapsed();

        info!("Finished!");
        info!("Parsed vehicles: {}", summary.parsed);
        info!("Saved {}/{} images", summary.saved, summary.downloaded);
        info!("Took: {:.2}s", summary.elapsed.as_secs_f64());
        summary
    }
}

/// The strictly sequential steps for one record.
async fn harvest_one<T: Transport, P: Prompter>(
    ctx: TaskContext<T, P>,
    record: VehicleRecord,
) -> TaskOutcome {
    // A record without an id is skipped silently, no counters change.
    let Some(vehicle_id) = record.vehicle_id else {
        return TaskOutcome::Skipped;
    };

    let detail_path = detail_link(vehicle_id, ctx.link_has_version);
    let detail = match fetch_detail(&ctx, &detail_path).await {
        Ok(detail) => detail,
        Err(message) => {
            error!(
                "Error downloading json: {}, url: {}",
                message,
                ctx.governor.full_url(&detail_path)
            );
            return failed(vehicle_id, Stage::DetailFetch, message);
        }
    };

    // Reaching selection is what the parsed counter counts, whether or not
    // a usable tag is found.
    let image_path = match select_preferred_image(&detail.images, &ctx.tag_preference) {
        Ok(url) => url,
        Err(e) => {
            error!("Error getting image url: {}", e);
            return failed(vehicle_id, Stage::Selection, e.to_string());
        }
    };

    let image = match fetch_image(&ctx, &image_path).await {
        Ok(image) => image,
        Err(message) => {
            error!(
                "Error downloading image: {}, url: {}",
                message,
                ctx.governor.full_url(&image_path)
            );
            return failed(vehicle_id, Stage::ImageFetch, message);
        }
    };

    let relative_path = ctx.director.save_path(&detail, &image);
    match ctx.store.save(&image, &relative_path).await {
        Ok(_) => TaskOutcome::Saved,
        Err(e) => {
            error!("Error saving image: {}", e);
            failed(vehicle_id, Stage::Save, e.to_string())
        }
    }
}

/// Detail request path; the api version segment depends on the machine.
fn detail_link(vehicle_id: i64, link_has_version: bool) -> String {
    format!(
        "/api{}/vehicle/detail?id={}",
        if link_has_version { "/1.0" } else { "" },
        vehicle_id
    )
}

async fn fetch_detail<T: Transport, P: Prompter>(
    ctx: &TaskContext<T, P>,
    detail_path: &str,
) -> Result<VehicleDetail, String> {
    let response = ctx
        .governor
        .fetch(detail_path, false)
        .await
        .map_err(|e| e.to_string())?;
    if !response.is_success() {
        return Err(bad_status(&response.status, &response.url));
    }
    parse_vehicle(&response.body).map_err(|e| e.to_string())
}

async fn fetch_image<T: Transport, P: Prompter>(
    ctx: &TaskContext<T, P>,
    image_path: &str,
) -> Result<Bytes, String> {
    let response = ctx
        .governor
        .fetch(image_path, false)
        .await
        .map_err(|e| e.to_string())?;
    if !response.is_success() {
        return Err(bad_status(&response.status, &response.url));
    }
    Ok(response.body)
}

fn bad_status(status: &reqwest::StatusCode, url: &str) -> String {
    format!(
        "Server responded with a bad status code: {} ({}), url: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("unknown"),
        url
    )
}

fn failed(vehicle_id: i64, stage: Stage, message: String) -> TaskOutcome {
    TaskOutcome::Failed(TaskFailure {
        vehicle_id,
        stage,
        message,
    })
}
