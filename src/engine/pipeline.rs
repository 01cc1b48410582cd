use crate::db::models::{Blueprint, CreateAiLogInput};
use crate::db::repos::{ai_logs, blueprints, profiles};
use crate::db::DbPool;
use crate::engine::generator::{self, ChatToolClient, Generation};
use crate::error::AppError;
use crate::validation::{validate_survey, SurveyForm, SurveySubmission};

/// Rough blended cost per token for the logged estimate.
const COST_PER_TOKEN_USD: f64 = 0.000005;

/// Result of a successful survey submission. A redirect is data, not an
/// error: the handler turns it into an HTTP redirect to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Redirect(String),
}

impl SubmitOutcome {
    pub fn path(&self) -> &str {
        match self {
            SubmitOutcome::Redirect(p) => p,
        }
    }
}

/// Full submission pipeline: validate, resolve profile, create blueprint,
/// generate opportunities, attach, redirect.
///
/// The blueprint row is created before generation is attempted, with
/// `opportunities` NULL. A failed attach is logged but does not abort the
/// submission; the blueprint stays regeneratable. A failed generation aborts
/// with a generic error, leaving the blueprint with NULL opportunities.
pub async fn submit_survey(
    pool: &DbPool,
    client: &dyn ChatToolClient,
    form: &SurveyForm,
) -> Result<SubmitOutcome, AppError> {
    // Client-side validation is untrusted; always re-validate here.
    let survey = validate_survey(form).map_err(AppError::Validation)?;

    let profile = profiles::resolve_by_email(pool, &survey.email)?;
    tracing::debug!(profile_id = %profile.id, email = %survey.email, "Profile resolved");

    let blueprint = blueprints::create(
        pool,
        blueprints::CreateBlueprintInput {
            profile_id: profile.id.clone(),
            initiative: survey.initiative.clone(),
            challenge: survey.challenge.clone(),
            systems: survey.systems.clone(),
            value: survey.value.clone(),
        },
    )?;
    tracing::info!(blueprint_id = %blueprint.id, "Blueprint created");

    let generation = generator::generate_opportunities(client, &survey).await?;

    attach_and_log(pool, &blueprint.id, &generation);

    Ok(SubmitOutcome::Redirect(format!("/dashboard/{}", blueprint.id)))
}

/// Re-run generation for an existing blueprint. This is the retry path for
/// blueprints whose generation failed (or whose attach was lost): the stored
/// survey fields are replayed through the generator and the result attached.
pub async fn regenerate(
    pool: &DbPool,
    client: &dyn ChatToolClient,
    blueprint_id: &str,
) -> Result<Blueprint, AppError> {
    let blueprint = blueprints::get_by_id(pool, blueprint_id)?;
    let profile = profiles::get_by_id(pool, &blueprint.profile_id)?;

    let survey = SurveySubmission {
        email: profile.email,
        initiative: blueprint.initiative.clone(),
        challenge: blueprint.challenge.clone(),
        systems: blueprint.systems.clone(),
        value: blueprint.value.clone(),
        contact_preference: None,
    };

    let generation = generator::generate_opportunities(client, &survey).await?;

    // Regeneration exists to fix a missing attach, so here the attach
    // failure is surfaced instead of tolerated.
    blueprints::attach_opportunities(pool, blueprint_id, &generation.opportunities)?;
    log_generation(pool, blueprint_id, &generation);

    blueprints::get_by_id(pool, blueprint_id)
}

/// Best-effort attach + AI log. Failures are logged server-side; the
/// submission still redirects because the blueprint exists and can be
/// regenerated later.
fn attach_and_log(pool: &DbPool, blueprint_id: &str, generation: &Generation) {
    if let Err(e) =
        blueprints::attach_opportunities(pool, blueprint_id, &generation.opportunities)
    {
        tracing::error!(blueprint_id = %blueprint_id, "Failed to attach opportunities: {e}");
        return;
    }
    log_generation(pool, blueprint_id, generation);
}

fn log_generation(pool: &DbPool, blueprint_id: &str, generation: &Generation) {
    let input = CreateAiLogInput {
        blueprint_id: blueprint_id.to_string(),
        prompt: generation.prompt.clone(),
        response: generation.raw_arguments.clone(),
        model: generation.model.clone(),
        tokens_used: generation.tokens_used,
        cost_estimate: generation.tokens_used as f64 * COST_PER_TOKEN_USD,
        duration_ms: generation.duration_ms,
    };
    if let Err(e) = ai_logs::insert(pool, input) {
        tracing::warn!(blueprint_id = %blueprint_id, "Failed to write AI log: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::engine::generator::test_support::FakeChatClient;
    use crate::engine::generator::ChatToolResponse;
    use crate::engine::tools::SAVE_OPPORTUNITIES;

    fn valid_form() -> SurveyForm {
        SurveyForm {
            email: "a@b.com".into(),
            initiative: "Streamline Onboarding".into(),
            challenge: "Manual data entry across three tools wastes hours daily".into(),
            systems: vec!["CRM (Salesforce, HubSpot)".into()],
            value: "Save 10 hours/week".into(),
            contact_preference: None,
        }
    }

    fn blueprint_id_from(outcome: &SubmitOutcome) -> String {
        outcome
            .path()
            .strip_prefix("/dashboard/")
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn end_to_end_submission_attaches_three_and_redirects() {
        let pool = init_test_db().unwrap();
        let client = FakeChatClient::three_valid();

        let outcome = submit_survey(&pool, &client, &valid_form()).await.unwrap();
        let id = blueprint_id_from(&outcome);

        let blueprint = blueprints::get_by_id(&pool, &id).unwrap();
        let opps = blueprint.opportunities.unwrap();
        assert_eq!(opps.len(), 3);

        // Profile resolved for the email
        let profile = profiles::resolve_by_email(&pool, "a@b.com").unwrap();
        assert_eq!(blueprint.profile_id, profile.id);

        // AI log written
        let logs = ai_logs::get_for_blueprint(&pool, &id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].model, "fake-model");
        assert!(logs[0].prompt.contains("Streamline Onboarding"));
    }

    #[tokio::test]
    async fn resubmission_reuses_profile() {
        let pool = init_test_db().unwrap();
        let client = FakeChatClient::three_valid();

        submit_survey(&pool, &client, &valid_form()).await.unwrap();
        submit_survey(&pool, &client, &valid_form()).await.unwrap();

        let conn = pool.get().unwrap();
        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))
            .unwrap();
        let blueprints: i64 = conn
            .query_row("SELECT COUNT(*) FROM blueprints", [], |r| r.get(0))
            .unwrap();
        assert_eq!(profiles, 1);
        assert_eq!(blueprints, 2);
    }

    #[tokio::test]
    async fn invalid_form_fails_before_any_write() {
        let pool = init_test_db().unwrap();
        let client = FakeChatClient::three_valid();

        let mut form = valid_form();
        form.email = "not-an-email".into();
        form.challenge = "short".into();

        let err = submit_survey(&pool, &client, &form).await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected Validation");
        };
        assert_eq!(errors.len(), 2);

        let conn = pool.get().unwrap();
        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(profiles, 0);
    }

    #[tokio::test]
    async fn wrong_count_leaves_blueprint_ungenerated() {
        let pool = init_test_db().unwrap();
        let args = serde_json::json!({
            "opportunities": [
                crate::engine::generator::test_support::opportunity_json("a"),
                crate::engine::generator::test_support::opportunity_json("b"),
            ]
        })
        .to_string();
        let client = FakeChatClient::with_opportunities(&args);

        let err = submit_survey(&pool, &client, &valid_form()).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));

        // Blueprint exists with NULL opportunities
        let conn = pool.get().unwrap();
        let (count, with_opps): (i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), COUNT(opportunities) FROM blueprints",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(with_opps, 0);
    }

    #[tokio::test]
    async fn regenerate_fills_in_missing_opportunities() {
        let pool = init_test_db().unwrap();

        // First attempt: model answers free text, generation fails
        let bad_client = FakeChatClient {
            response: Ok(ChatToolResponse {
                tool_name: None,
                arguments: None,
                tokens_used: 5,
            }),
        };
        assert!(submit_survey(&pool, &bad_client, &valid_form()).await.is_err());

        let conn = pool.get().unwrap();
        let id: String = conn
            .query_row("SELECT id FROM blueprints", [], |r| r.get(0))
            .unwrap();
        drop(conn);

        // Retry with a working client
        let good_client = FakeChatClient::three_valid();
        let blueprint = regenerate(&pool, &good_client, &id).await.unwrap();
        assert_eq!(blueprint.opportunities.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn regenerate_missing_blueprint_is_not_found() {
        let pool = init_test_db().unwrap();
        let client = FakeChatClient::three_valid();
        let err = regenerate(&pool, &client, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn tool_name_constant_matches_contract() {
        assert_eq!(SAVE_OPPORTUNITIES, "save_opportunities");
    }
}
