use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserProfile,
    response::{ApiResponse, Meta},
};

pub async fn get_profile(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let profile: Option<UserProfile> =
        sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Profile", profile, None))
}

pub async fn update_profile(
    pool: &DbPool,
    user: &AuthUser,
    address: String,
    phone: String,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile: Option<UserProfile> = sqlx::query_as(
        r#"
        UPDATE user_profiles
        SET address = $2, phone = $3
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(address)
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Profile updated",
        profile,
        Some(Meta::empty()),
    ))
}
