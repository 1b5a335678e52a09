use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{insert_into, prelude::*, update, upsert::excluded};
use prost_types::Timestamp;
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;
use zapeat_proto::auth_service::{
    self as proto, auth_service_server::AuthService, AddStaffMemberPayload, GetTokenInfoPayload,
    GetUserPayload, SendVerificationCodePayload, SendVerificationCodeResponse, TokenInfo,
    TokenResponse, UpdateProfilePayload, VerifyPhonePayload,
};

use crate::config::establish_connection;
use crate::error::AuthError;
use crate::models::{ProfileChanges, StaffMembership, StaffRole, User};
use crate::otp::{generate_code, normalize_mobile_number};
use crate::schema::{staff_memberships, users};
use crate::sms::{verification_message, SmsSender};
use crate::tokens::TokenIssuer;

pub struct AuthServiceImpl<S> {
    database_url: String,
    tokens: TokenIssuer,
    sms: S,
}

impl<S: SmsSender> AuthServiceImpl<S> {
    pub fn new(database_url: impl Into<String>, tokens: TokenIssuer, sms: S) -> Self {
        Self {
            database_url: database_url.into(),
            tokens,
            sms,
        }
    }

    fn connect(&self) -> Result<PgConnection, AuthError> {
        Ok(establish_connection(&self.database_url)?)
    }
}

#[tonic::async_trait]
impl<S: SmsSender> AuthService for AuthServiceImpl<S> {
    async fn send_verification_code(
        &self,
        request: Request<SendVerificationCodePayload>,
    ) -> Result<Response<SendVerificationCodeResponse>, Status> {
        let mobile_number = normalize_mobile_number(&request.into_inner().mobile_number)?;
        let code = generate_code();
        let session_token = self.tokens.issue_session_token(&mobile_number, &code)?;

        let conn = &mut self.connect()?;
        let user = get_or_create_user(conn, &mobile_number)?;
        self.sms.send(
            &mobile_number,
            &verification_message(&code, self.tokens.session_expires().num_minutes()),
        )
        .map_err(AuthError::from)?;
        info!(user_id = %user.id, "verification code sent");

        Ok(Response::new(SendVerificationCodeResponse {
            session_token,
            mobile_number,
        }))
    }

    async fn verify_phone(
        &self,
        request: Request<VerifyPhonePayload>,
    ) -> Result<Response<TokenResponse>, Status> {
        let payload = request.into_inner();
        let mobile_number = normalize_mobile_number(&payload.mobile_number)?;
        self.tokens.verify_session_token(
            &payload.session_token,
            &mobile_number,
            payload.security_code.trim(),
        )?;

        let conn = &mut self.connect()?;
        let user = update(users::table.filter(users::mobile_number.eq(&mobile_number)))
            .set(users::is_phone_verified.eq(true))
            .returning(User::as_returning())
            .get_result(conn)
            .optional()
            .map_err(AuthError::from)?
            .ok_or(AuthError::NotFound("User"))?;
        let access_token = self.tokens.issue_access_token(&user.id)?;
        info!(user_id = %user.id, "phone verified");

        Ok(Response::new(TokenResponse {
            token_type: "bearer".to_string(),
            access_token,
            expires_in: self.tokens.access_token_expires().num_seconds(),
            user_id: user.id.to_string(),
        }))
    }

    async fn get_token_info(
        &self,
        request: Request<GetTokenInfoPayload>,
    ) -> Result<Response<TokenInfo>, Status> {
        let user_id = self
            .tokens
            .verify_access_token(&request.into_inner().token)?;
        let conn = &mut self.connect()?;
        let user = find_user_by_id(conn, &user_id).map_err(|e| match e {
            AuthError::NotFound(_) => AuthError::InactiveUser,
            e => e,
        })?;
        let user_id = active_user_id(&user)?;
        Ok(Response::new(TokenInfo {
            user_id: user_id.to_string(),
        }))
    }

    async fn get_user(
        &self,
        request: Request<GetUserPayload>,
    ) -> Result<Response<proto::User>, Status> {
        let id = parse_user_id(&request.into_inner().id)?;
        let conn = &mut self.connect()?;
        let user = find_user_by_id(conn, &id)?;
        Ok(Response::new(load_user(conn, user)?))
    }

    async fn update_profile(
        &self,
        request: Request<UpdateProfilePayload>,
    ) -> Result<Response<proto::User>, Status> {
        let payload = request.into_inner();
        let id = parse_user_id(&payload.id)?;
        let changes = profile_changes(payload.name, payload.email)?;

        let conn = &mut self.connect()?;
        let user = if changes.is_empty() {
            find_user_by_id(conn, &id)?
        } else {
            update(users::table.find(id))
                .set(&changes)
                .returning(User::as_returning())
                .get_result(conn)
                .optional()
                .map_err(profile_update_error)?
                .ok_or(AuthError::NotFound("User"))?
        };
        info!(user_id = %user.id, "profile updated");

        Ok(Response::new(load_user(conn, user)?))
    }

    async fn add_staff_member(
        &self,
        request: Request<AddStaffMemberPayload>,
    ) -> Result<Response<proto::User>, Status> {
        let payload = request.into_inner();
        let mobile_number = normalize_mobile_number(&payload.mobile_number)?;
        let restaurant_id: Uuid = payload
            .restaurant_id
            .parse()
            .map_err(|_| Status::invalid_argument("Invalid restaurant id"))?;
        let role = proto::StaffRole::try_from(payload.role)
            .map(StaffRole::from)
            .map_err(|_| Status::invalid_argument("Invalid staff role"))?;

        let conn = &mut self.connect()?;
        let user = find_user_by_mobile_number(conn, &mobile_number)?;
        let membership = StaffMembership {
            user_id: user.id,
            restaurant_id,
            role,
            is_active: true,
            created_at: Utc::now(),
        };
        insert_into(staff_memberships::table)
            .values(&membership)
            .on_conflict((staff_memberships::user_id, staff_memberships::restaurant_id))
            .do_update()
            .set((
                staff_memberships::role.eq(excluded(staff_memberships::role)),
                staff_memberships::is_active.eq(true),
            ))
            .execute(conn)
            .map_err(AuthError::from)?;
        info!(user_id = %user.id, %restaurant_id, ?role, "staff member added");

        Ok(Response::new(load_user(conn, user)?))
    }
}

fn parse_user_id(id: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(id).map_err(|_| Status::invalid_argument("Invalid id"))
}

/// Blank values clear the field.
fn profile_changes(
    name: Option<String>,
    email: Option<String>,
) -> Result<ProfileChanges, AuthError> {
    let blank_to_none = |v: String| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    };
    let email = email.map(blank_to_none);
    if let Some(Some(ref email)) = email {
        if !email.contains('@') {
            return Err(AuthError::Validation {
                field: "email".to_string(),
                description: "Enter a valid email address".to_string(),
            });
        }
    }
    Ok(ProfileChanges {
        name: name.map(blank_to_none),
        email,
    })
}

/// Email is the only unique column a profile update touches.
fn profile_update_error(err: DieselError) -> AuthError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AuthError::Validation {
                field: "email".to_string(),
                description: "User with this email already exists".to_string(),
            }
        }
        err => AuthError::Database(err),
    }
}

fn active_user_id(user: &User) -> Result<Uuid, AuthError> {
    if user.is_active {
        Ok(user.id)
    } else {
        Err(AuthError::InactiveUser)
    }
}

fn get_or_create_user(conn: &mut PgConnection, mobile_number: &str) -> Result<User, AuthError> {
    let user = User {
        id: Uuid::new_v4(),
        mobile_number: mobile_number.to_string(),
        email: None,
        name: None,
        is_phone_verified: false,
        is_active: true,
        date_joined: Utc::now(),
    };
    let created = insert_into(users::table)
        .values(&user)
        .on_conflict(users::mobile_number)
        .do_nothing()
        .execute(conn)?;
    if created > 0 {
        info!(user_id = %user.id, "user created");
    }
    find_user_by_mobile_number(conn, mobile_number)
}

fn find_user_by_id(conn: &mut PgConnection, id: &Uuid) -> Result<User, AuthError> {
    users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(AuthError::NotFound("User"))
}

fn find_user_by_mobile_number(
    conn: &mut PgConnection,
    mobile_number: &str,
) -> Result<User, AuthError> {
    users::table
        .filter(users::mobile_number.eq(mobile_number))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(AuthError::NotFound("User"))
}

fn load_user(conn: &mut PgConnection, user: User) -> Result<proto::User, AuthError> {
    let memberships = StaffMembership::belonging_to(&user)
        .select(StaffMembership::as_select())
        .order(staff_memberships::created_at.asc())
        .load(conn)?;
    Ok(serialize_user(user, &memberships))
}

fn serialize_user(user: User, memberships: &[StaffMembership]) -> proto::User {
    proto::User {
        id: user.id.to_string(),
        mobile_number: user.mobile_number,
        email: user.email,
        name: user.name,
        is_phone_verified: user.is_phone_verified,
        is_active: user.is_active,
        date_joined: Some(Timestamp {
            seconds: user.date_joined.timestamp(),
            nanos: user.date_joined.timestamp_subsec_nanos() as i32,
        }),
        memberships: memberships
            .iter()
            .map(|m| proto::StaffMembership {
                restaurant_id: m.restaurant_id.to_string(),
                role: proto::StaffRole::from(m.role).into(),
                is_active: m.is_active,
            })
            .collect(),
    }
}
