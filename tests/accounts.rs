use axum_storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::RegisterRequest,
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service, profile_service},
    state::AppState,
};
use uuid::Uuid;

async fn try_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState { pool, orm }))
}

#[tokio::test]
async fn register_creates_user_with_empty_profile() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let username = format!("user-{}", Uuid::new_v4());
    let resp = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            username: username.clone(),
            password: "hunter22".into(),
        },
    )
    .await?;
    let user = resp.data.unwrap();
    assert_eq!(user.username, username);
    assert_eq!(user.role, "user");

    let auth = AuthUser {
        user_id: user.id,
        role: user.role.clone(),
    };
    let profile = profile_service::get_profile(&state.pool, &auth).await?;
    let profile = profile.data.unwrap();
    assert_eq!(profile.address, "");
    assert_eq!(profile.phone, "");

    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_rejected() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let username = format!("user-{}", Uuid::new_v4());
    auth_service::register_user(
        &state.pool,
        RegisterRequest {
            username: username.clone(),
            password: "first".into(),
        },
    )
    .await?;

    let err = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            username,
            password: "second".into(),
        },
    )
    .await
    .expect_err("duplicate username must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn racing_registrations_yield_one_user_and_a_400() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    // Whichever registration loses the race hits the unique constraint
    // on insert; that must still surface as BadRequest, not a database
    // error.
    let username = format!("user-{}", Uuid::new_v4());
    let request = || RegisterRequest {
        username: username.clone(),
        password: "hunter22".into(),
    };

    let (res_a, res_b) = tokio::join!(
        auth_service::register_user(&state.pool, request()),
        auth_service::register_user(&state.pool, request()),
    );

    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for res in [res_a, res_b] {
        if let Err(err) = res {
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    Ok(())
}

#[tokio::test]
async fn profile_update_round_trips() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let resp = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            username: format!("user-{}", Uuid::new_v4()),
            password: "hunter22".into(),
        },
    )
    .await?;
    let user = resp.data.unwrap();
    let auth = AuthUser {
        user_id: user.id,
        role: user.role.clone(),
    };

    profile_service::update_profile(
        &state.pool,
        &auth,
        "1 Ferris Way".into(),
        "555-0100".into(),
    )
    .await?;

    let profile = profile_service::get_profile(&state.pool, &auth).await?;
    let profile = profile.data.unwrap();
    assert_eq!(profile.address, "1 Ferris Way");
    assert_eq!(profile.phone, "555-0100");

    Ok(())
}
