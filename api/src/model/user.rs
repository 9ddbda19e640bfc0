use garde::Validate;
use kernel::model::{
    role::Role,
    user::{event::CreateUser, User},
    id::UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    User,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => Self::Admin,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Admin => Self::Admin,
            RoleName::User => Self::User,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            items: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: RoleName,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            username,
            email,
            role,
        } = value;
        Self {
            user_id,
            username,
            email,
            role: RoleName::from(role),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[garde(length(min = 1))]
    pub username: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8))]
    pub password: String,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(value: CreateUserRequest) -> Self {
        let CreateUserRequest {
            username,
            email,
            password,
        } = value;
        // self-registration never grants privileges
        CreateUser {
            username,
            email,
            password,
            role: Role::User,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRoleRequest {
    pub role: RoleName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_request_rejects_unknown_fields() {
        let raw = r#"{"username":"aiko","email":"aiko@example.ac.jp","password":"open sesame","role":"admin"}"#;
        assert!(serde_json::from_str::<CreateUserRequest>(raw).is_err());
    }

    #[test]
    fn short_password_fails_validation() {
        let raw = r#"{"username":"aiko","email":"aiko@example.ac.jp","password":"short"}"#;
        let req: CreateUserRequest = serde_json::from_str(raw).unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn registration_always_produces_a_plain_user() {
        let raw = r#"{"username":"aiko","email":"aiko@example.ac.jp","password":"open sesame"}"#;
        let req: CreateUserRequest = serde_json::from_str(raw).unwrap();
        let event = CreateUser::from(req);
        assert_eq!(event.role, Role::User);
    }
}
