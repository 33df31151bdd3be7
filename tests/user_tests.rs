mod common;

use common::spawn_app;
use recipe_api::{db::users as db_users, error::AppError, models::UserExtra, services::accounts};

#[tokio::test]
async fn test_create_user_with_email_successful() {
    let app = spawn_app().await;

    let user = accounts::create_user(&app.pool, Some("test@example.com"), "testpass123", UserExtra::default())
        .await
        .unwrap();

    assert_eq!(user.email, "test@example.com");
    assert!(user.is_active);
    assert!(!user.is_staff);
    assert!(accounts::verify_password("testpass123", &user.password_hash).unwrap());
}

#[tokio::test]
async fn test_new_user_email_normalized() {
    let app = spawn_app().await;
    let samples = [
        ("test1@EXAMPLE.com", "test1@example.com"),
        ("Test2@Example.com", "test2@example.com"),
        ("TEST3@EXAMPLE.COM", "test3@example.com"),
        ("test4@example.COM", "test4@example.com"),
    ];

    for (email, expected) in samples {
        let user = accounts::create_user(&app.pool, Some(email), "sample123", UserExtra::default())
            .await
            .unwrap();
        assert_eq!(user.email, expected);
    }
}

#[tokio::test]
async fn test_new_user_without_email_raises_error() {
    let app = spawn_app().await;

    for email in [None, Some(""), Some("   ")] {
        let err = accounts::create_user(&app.pool, email, "test123", UserExtra::default())
            .await
            .unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.get("email").is_some());
    }
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = spawn_app().await;

    accounts::create_user(&app.pool, Some("dup@example.com"), "test123", UserExtra::default())
        .await
        .unwrap();
    let err = accounts::create_user(&app.pool, Some("DUP@example.com"), "test123", UserExtra::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_superuser() {
    let app = spawn_app().await;

    let user = accounts::create_superuser(&app.pool, "admin@example.com", "test123")
        .await
        .unwrap();

    assert!(user.is_superuser);
    assert!(user.is_staff);

    let stored = db_users::find_by_id(&app.pool, user.id).await.unwrap().unwrap();
    assert!(stored.is_superuser);
    assert!(stored.is_staff);
}

#[tokio::test]
async fn test_concurrent_duplicate_email_is_validation_error() {
    let app = spawn_app().await;

    let (first, second) = tokio::join!(
        accounts::create_user(&app.pool, Some("race@example.com"), "test123", UserExtra::default()),
        accounts::create_user(&app.pool, Some("RACE@example.com"), "test123", UserExtra::default()),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results {
        if let Err(err) = result {
            let AppError::Validation(fields) = err else {
                panic!("expected validation error");
            };
            assert!(fields.get("email").is_some());
        }
    }
}

#[tokio::test]
async fn test_email_unique_in_storage_and_service() {
    let app = spawn_app().await;

    // 저장소 계층은 UNIQUE 위반을 그대로 돌려줍니다.
    let hash = accounts::hash_password("test123").unwrap();
    db_users::create_user(&app.pool, "taken@example.com", &hash, &UserExtra::default())
        .await
        .unwrap();
    let err = db_users::create_user(&app.pool, "taken@example.com", &hash, &UserExtra::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let err = accounts::create_user(&app.pool, Some("taken@example.com"), "test123", UserExtra::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_authenticate_rejects_inactive_and_wrong_password() {
    let app = spawn_app().await;

    let inactive = UserExtra {
        is_active: false,
        ..UserExtra::default()
    };
    accounts::create_user(&app.pool, Some("gone@example.com"), "test123", inactive)
        .await
        .unwrap();
    accounts::create_user(&app.pool, Some("here@example.com"), "test123", UserExtra::default())
        .await
        .unwrap();

    assert!(matches!(
        accounts::authenticate(&app.pool, "gone@example.com", "test123").await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        accounts::authenticate(&app.pool, "here@example.com", "wrong").await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(accounts::authenticate(&app.pool, "HERE@example.com", "test123").await.is_ok());
}
