use crate::config::DashboardSettings;
use crate::core::schema_form::{config_fields, credential_fields};
use crate::core::{
    assemble_object, build_compare_view, build_form, build_match_view, compare_request,
    distinct_banks, ComparePair, CompareView, ContentSubmission, DashboardView, ExchangeForm,
    MatchView, QuerySubmission, RemovalBatch, RemovalPhase, RemovalSummary, RemovalTarget, Slot,
    StatCardView, TimeSpan, UploadedFile, ValidationError,
};
use crate::core::validation::validate_bank_name;
use crate::error::ConsoleError;
use crate::models::{
    AddContentView, BankSummary, CreateExchangeRequest, EnabledRatio, ExchangeCreated,
};
use crate::services::hma::{HmaClient, HmaError};
use futures_util::future::join_all;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Orchestrates operator workflows against the HMA API
///
/// Holds no per-request state; every workflow builds its view from scratch.
#[derive(Debug, Clone)]
pub struct Console {
    hma: HmaClient,
    dashboard: DashboardSettings,
}

impl Console {
    pub fn new(hma: HmaClient, dashboard: DashboardSettings) -> Self {
        Self { hma, dashboard }
    }

    /// Upstream liveness, as shown on the health endpoint
    pub async fn upstream_health(&self) -> String {
        match self.hma.status().await {
            Ok(_) => "ok".to_string(),
            Err(e) => {
                warn!("HMA status check failed: {}", e);
                "unreachable".to_string()
            }
        }
    }

    /// Run a match lookup and decorate the rows with each bank's enabled ratio
    pub async fn query(&self, submission: &QuerySubmission) -> Result<MatchView, ConsoleError> {
        info!(
            "Match lookup by {} (bypass_enabled_ratio: {})",
            submission.content.modality(),
            submission.bypass_enabled_ratio
        );

        let result = self.hma.query(submission).await?;
        let ratios = self.resolve_banks(&distinct_banks(&result)).await;

        debug!(
            "Lookup returned {} matches across {} banks",
            result.matches.len(),
            ratios.len()
        );

        Ok(build_match_view(&result, &ratios))
    }

    /// Fetch every bank concurrently; a failed lookup becomes `Unknown`
    pub async fn resolve_banks(&self, names: &[String]) -> BTreeMap<String, EnabledRatio> {
        let lookups = names.iter().map(|name| async move {
            let ratio = match self.hma.get_bank(name).await {
                Ok(bank) => EnabledRatio::from(&bank),
                Err(e) => {
                    warn!("Bank lookup for {} failed: {}", name, e);
                    EnabledRatio::Unknown
                }
            };
            (name.clone(), ratio)
        });

        join_all(lookups).await.into_iter().collect()
    }

    pub async fn list_banks(&self) -> Result<Vec<BankSummary>, ConsoleError> {
        let banks = self.hma.list_banks().await?;
        Ok(banks
            .iter()
            .map(|bank| {
                let ratio = EnabledRatio::from(bank);
                BankSummary {
                    name: bank.name.clone(),
                    enabled_ratio: ratio.percent_text(),
                    partially_enabled: ratio.is_partial(),
                }
            })
            .collect())
    }

    pub async fn add_content(
        &self,
        bank: &str,
        content: &ContentSubmission,
    ) -> Result<AddContentView, ConsoleError> {
        let added = self.hma.add_content(bank, content).await?;
        info!(
            "Added {} content {} to bank {}",
            content.modality(),
            added.id,
            bank
        );

        Ok(AddContentView {
            bank: bank.to_string(),
            content_id: added.id,
            signals: added.signals,
        })
    }

    /// Find-then-delete removal; deletes run one at a time, in find order
    pub async fn remove_content(
        &self,
        bank: &str,
        target: &RemovalTarget,
    ) -> Result<RemovalSummary, ConsoleError> {
        let mut batch = RemovalBatch::new();

        if let Some(query) = target.find_query() {
            batch.begin_find()?;
            let ids = self.hma.find_content(bank, &query).await?;
            debug!("Find in bank {} resolved {} content ids", bank, ids.len());
            batch.found(ids)?;
        } else if let RemovalTarget::Id(id) = target {
            batch.direct(id.clone())?;
        }

        if batch.phase() == &RemovalPhase::NotFound {
            info!("Nothing to remove from bank {}", bank);
            return Err(ConsoleError::NothingToRemove(target.not_found_message()));
        }

        while let Some(content_id) = batch.next_target().cloned() {
            let result = match self.hma.delete_content(bank, &content_id).await {
                Ok(deleted) => Ok(deleted.deleted),
                Err(e) => {
                    warn!("Delete of {} from bank {} failed: {}", content_id, bank, e);
                    Err(e.to_string())
                }
            };
            batch.record(result)?;
        }

        let summary = batch.summary()?;
        info!(
            "Removed {} of {} items from bank {}",
            summary.removed,
            summary.content_ids.len(),
            bank
        );
        Ok(summary)
    }

    pub async fn exchange_apis(&self) -> Result<Vec<String>, ConsoleError> {
        Ok(self.hma.exchange_apis().await?)
    }

    pub async fn exchange_form(&self, api: &str) -> Result<ExchangeForm, ConsoleError> {
        let api = required_api(api)?;
        let schema = self.hma.exchange_schema(api).await?;
        Ok(build_form(api, &schema))
    }

    /// Set credentials (when any were given), then create the exchange
    ///
    /// The schema is fetched again so submitted values are coerced against
    /// the field types the upstream currently advertises.
    pub async fn create_exchange(
        &self,
        request: &CreateExchangeRequest,
    ) -> Result<ExchangeCreated, ConsoleError> {
        let api = required_api(&request.api)?;
        let bank = validate_bank_name(&request.bank)?;

        let schema = self.hma.exchange_schema(api).await?;
        let api_json = assemble_object(&config_fields(&schema), &request.config);
        let credential_json = assemble_object(&credential_fields(&schema), &request.credentials);

        let credentials_set = !credential_json.is_empty();
        if credentials_set {
            self.hma
                .set_exchange_credentials(api, &credential_json)
                .await
                .map_err(|e| {
                    warn!("Credential update for {} rejected: {}", api, e);
                    credentials_rejected(e)
                })?;
        }

        self.hma.create_exchange(api, &bank, &api_json).await?;
        info!("Created {} exchange for bank {}", api, bank);

        Ok(ExchangeCreated {
            api: api.to_string(),
            bank,
            credentials_set,
            api_json,
        })
    }

    /// Load every configured stat card concurrently
    pub async fn dashboard(&self, time_span: TimeSpan) -> DashboardView {
        let mut view = DashboardView::loading(time_span, &self.dashboard.stat_names);

        let fetches = self.dashboard.stat_names.iter().map(|name| async move {
            (name, self.hma.stats(name, time_span.as_str()).await)
        });

        for (name, result) in join_all(fetches).await {
            let card = match result {
                Ok(card) => StatCardView::ready(name, &card),
                Err(e) => {
                    warn!("Stat {} unavailable: {}", name, e);
                    StatCardView::unavailable(self.dashboard.metrics_url.as_deref())
                }
            };
            view.resolve(name, card);
        }

        view
    }

    /// Hash two photos and compare them signal type by signal type
    pub async fn compare_files(
        &self,
        left: &UploadedFile,
        right: &UploadedFile,
    ) -> Result<CompareView, ConsoleError> {
        let mut pending: FuturesUnordered<_> = [(Slot::Left, left), (Slot::Right, right)]
            .into_iter()
            .map(|(slot, file)| async move { (slot, self.hma.hash_photo(file).await) })
            .collect();

        let mut pair = ComparePair::new();
        let mut both = None;
        while let Some((slot, result)) = pending.next().await {
            both = pair.fill(slot, result?);
        }
        let (left, right) =
            both.ok_or(ValidationError::MissingComparisonFile(Slot::Right.part_name()))?;

        let request = compare_request(&left, &right);
        let results = if request.is_empty() {
            BTreeMap::new()
        } else {
            self.hma.compare(&request).await?
        };

        Ok(build_compare_view(left, right, &results))
    }
}

fn required_api(api: &str) -> Result<&str, ValidationError> {
    let api = api.trim();
    if api.is_empty() {
        return Err(ValidationError::MissingExchangeApi);
    }
    Ok(api)
}

fn credentials_rejected(err: HmaError) -> ConsoleError {
    let status = err.status();
    let message = match err {
        HmaError::ApiError { message, .. } | HmaError::NotFound(message) => message,
        other => other.to_string(),
    };
    ConsoleError::CredentialsRejected { status, message }
}
