//! Development seed data: a small two-team exercise with a facilitator, a
//! scoring model and one group-based observer grant. Idempotent; every
//! insert is a no-op when the row already exists.

use scorecast_core::{AppError, AppResult};
use scorecast_domain::RoleCatalog;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

const DEV_SEED_FACILITATOR_ID: &str = "8f4f3d0a-91a7-4a9e-b6cf-0f6de2a5b101";
const DEV_SEED_BLUE_MEMBER_ID: &str = "8f4f3d0a-91a7-4a9e-b6cf-0f6de2a5b102";
const DEV_SEED_RED_MEMBER_ID: &str = "8f4f3d0a-91a7-4a9e-b6cf-0f6de2a5b103";
const DEV_SEED_OBSERVER_ID: &str = "8f4f3d0a-91a7-4a9e-b6cf-0f6de2a5b104";
const DEV_SEED_OBSERVER_GROUP_ID: &str = "9a1f5cf2-2c68-4d3b-8a3b-3a2f4f6c0201";
const DEV_SEED_MODEL_ID: &str = "b27a6a80-5a44-41fe-9b41-6d9e1f2a0301";
const DEV_SEED_IMPACT_CATEGORY_ID: &str = "b27a6a80-5a44-41fe-9b41-6d9e1f2a0302";
const DEV_SEED_READINESS_CATEGORY_ID: &str = "b27a6a80-5a44-41fe-9b41-6d9e1f2a0303";
const DEV_SEED_EVALUATION_ID: &str = "c91d2f34-7b11-4c59-9a77-5e0c8d3b0401";
const DEV_SEED_PLAYER_TYPE_ID: &str = "c91d2f34-7b11-4c59-9a77-5e0c8d3b0402";
const DEV_SEED_BLUE_TEAM_ID: &str = "c91d2f34-7b11-4c59-9a77-5e0c8d3b0403";
const DEV_SEED_RED_TEAM_ID: &str = "c91d2f34-7b11-4c59-9a77-5e0c8d3b0404";
const DEV_SEED_OPTION_IDS: [&str; 5] = [
    "d45e8a10-3c27-4f6d-8e19-7b2a9c4d0501",
    "d45e8a10-3c27-4f6d-8e19-7b2a9c4d0502",
    "d45e8a10-3c27-4f6d-8e19-7b2a9c4d0503",
    "d45e8a10-3c27-4f6d-8e19-7b2a9c4d0504",
    "d45e8a10-3c27-4f6d-8e19-7b2a9c4d0505",
];

pub async fn run(pool: &PgPool) -> AppResult<()> {
    let facilitator_id = parse_uuid_const(DEV_SEED_FACILITATOR_ID, "DEV_SEED_FACILITATOR_ID")?;
    let blue_member_id = parse_uuid_const(DEV_SEED_BLUE_MEMBER_ID, "DEV_SEED_BLUE_MEMBER_ID")?;
    let red_member_id = parse_uuid_const(DEV_SEED_RED_MEMBER_ID, "DEV_SEED_RED_MEMBER_ID")?;
    let observer_id = parse_uuid_const(DEV_SEED_OBSERVER_ID, "DEV_SEED_OBSERVER_ID")?;
    let observer_group_id =
        parse_uuid_const(DEV_SEED_OBSERVER_GROUP_ID, "DEV_SEED_OBSERVER_GROUP_ID")?;
    let model_id = parse_uuid_const(DEV_SEED_MODEL_ID, "DEV_SEED_MODEL_ID")?;
    let impact_category_id =
        parse_uuid_const(DEV_SEED_IMPACT_CATEGORY_ID, "DEV_SEED_IMPACT_CATEGORY_ID")?;
    let readiness_category_id = parse_uuid_const(
        DEV_SEED_READINESS_CATEGORY_ID,
        "DEV_SEED_READINESS_CATEGORY_ID",
    )?;
    let evaluation_id = parse_uuid_const(DEV_SEED_EVALUATION_ID, "DEV_SEED_EVALUATION_ID")?;
    let player_type_id = parse_uuid_const(DEV_SEED_PLAYER_TYPE_ID, "DEV_SEED_PLAYER_TYPE_ID")?;
    let blue_team_id = parse_uuid_const(DEV_SEED_BLUE_TEAM_ID, "DEV_SEED_BLUE_TEAM_ID")?;
    let red_team_id = parse_uuid_const(DEV_SEED_RED_TEAM_ID, "DEV_SEED_RED_TEAM_ID")?;

    seed_user(pool, facilitator_id, "Dev Facilitator").await?;
    seed_user(pool, blue_member_id, "Blue Member").await?;
    seed_user(pool, red_member_id, "Red Member").await?;
    seed_user(pool, observer_id, "Dev Observer").await?;

    sqlx::query(
        r#"
        INSERT INTO groups (id, name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(observer_group_id)
    .bind("Exercise Observers")
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev group: {error}")))?;

    sqlx::query(
        r#"
        INSERT INTO group_memberships (group_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(observer_group_id)
    .bind(observer_id)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev group member: {error}")))?;

    sqlx::query(
        r#"
        INSERT INTO scoring_models (id, name, equation)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(model_id)
    .bind("Operational Impact Model")
    .bind("weighted_sum")
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev scoring model: {error}")))?;

    seed_category(pool, impact_category_id, model_id, "Mission Impact", 0.6).await?;
    seed_category(pool, readiness_category_id, model_id, "Readiness", 0.4).await?;

    for (option_id, category_id, name, value) in [
        (DEV_SEED_OPTION_IDS[0], impact_category_id, "Severe degradation", 90.0),
        (DEV_SEED_OPTION_IDS[1], impact_category_id, "Partial degradation", 50.0),
        (DEV_SEED_OPTION_IDS[2], impact_category_id, "No effect", 0.0),
        (DEV_SEED_OPTION_IDS[3], readiness_category_id, "Fully ready", 100.0),
        (DEV_SEED_OPTION_IDS[4], readiness_category_id, "Degraded readiness", 40.0),
    ] {
        sqlx::query(
            r#"
            INSERT INTO scoring_options (id, scoring_category_id, name, value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(parse_uuid_const(option_id, "DEV_SEED_OPTION_IDS")?)
        .bind(category_id)
        .bind(name)
        .bind(value)
        .execute(pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to seed dev scoring option: {error}"))
        })?;
    }

    sqlx::query(
        r#"
        INSERT INTO evaluations (id, name, scoring_model_id, current_move_number)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(evaluation_id)
    .bind("Autumn Shield 26")
    .bind(model_id)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev evaluation: {error}")))?;

    sqlx::query(
        r#"
        INSERT INTO team_types (id, name, show_type_average)
        VALUES ($1, $2, TRUE)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(player_type_id)
    .bind("Player")
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev team type: {error}")))?;

    seed_team(pool, blue_team_id, evaluation_id, player_type_id, "Blue Cell").await?;
    seed_team(pool, red_team_id, evaluation_id, player_type_id, "Red Cell").await?;

    sqlx::query(
        r#"
        INSERT INTO evaluation_memberships (evaluation_id, principal_kind, principal_id, role_id)
        VALUES ($1, 'user', $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(evaluation_id)
    .bind(facilitator_id)
    .bind(RoleCatalog::EVALUATION_FACILITATOR.as_uuid())
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev facilitator grant: {error}")))?;

    sqlx::query(
        r#"
        INSERT INTO evaluation_memberships (evaluation_id, principal_kind, principal_id, role_id)
        VALUES ($1, 'group', $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(evaluation_id)
    .bind(observer_group_id)
    .bind(RoleCatalog::EVALUATION_OBSERVER.as_uuid())
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev observer grant: {error}")))?;

    seed_team_member(pool, blue_team_id, blue_member_id).await?;
    seed_team_member(pool, red_team_id, red_member_id).await?;

    info!("dev seed data applied");
    Ok(())
}

async fn seed_user(pool: &PgPool, user_id: Uuid, display_name: &str) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, display_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(display_name)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev user: {error}")))?;
    Ok(())
}

async fn seed_category(
    pool: &PgPool,
    category_id: Uuid,
    model_id: Uuid,
    name: &str,
    weight: f64,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO scoring_categories (id, scoring_model_id, name, weight)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(category_id)
    .bind(model_id)
    .bind(name)
    .bind(weight)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev scoring category: {error}")))?;
    Ok(())
}

async fn seed_team(
    pool: &PgPool,
    team_id: Uuid,
    evaluation_id: Uuid,
    team_type_id: Uuid,
    name: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO teams (id, evaluation_id, team_type_id, name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(evaluation_id)
    .bind(team_type_id)
    .bind(name)
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev team: {error}")))?;
    Ok(())
}

async fn seed_team_member(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO team_memberships (team_id, user_id, role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .bind(RoleCatalog::TEAM_MEMBER.as_uuid())
    .execute(pool)
    .await
    .map_err(|error| AppError::Internal(format!("failed to seed dev team member: {error}")))?;
    Ok(())
}

fn parse_uuid_const(value: &str, name: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|error| AppError::Internal(format!("invalid {name} constant: {error}")))
}
