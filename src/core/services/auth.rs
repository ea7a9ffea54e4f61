use hex::ToHex;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

use crate::core::models::user::{User, UserInsert};
use crate::core::ports::repository::{Store, UserCommon};
use crate::error::Error;
use crate::request::Signup;

fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    let chars = vec![
        '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
        'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    ];
    let mut slt = String::new();
    let mut rng = thread_rng();
    for _ in 0..32 {
        let i = rng.gen_range(0..chars.len());
        slt.push(chars[i]);
    }
    slt
}

pub async fn authenticate<D>(db: &mut D, identity: &str, password: &str) -> Result<User, Error>
where
    D: Store,
{
    let user = UserCommon::get_by_username_or_email(db, identity)
        .await?
        .ok_or_else(|| Error::Unauthorized("invalid username/email or password".into()))?;
    if hash_password(password, &user.salt) != user.password {
        return Err(Error::Unauthorized("invalid username/email or password".into()));
    }
    Ok(user)
}

pub async fn register<D>(db: &mut D, signup: Signup) -> Result<i64, Error>
where
    D: Store,
{
    let name_len = signup.name.trim().chars().count();
    if name_len < 4 || name_len > 40 {
        return Err(Error::InvalidRequest("name must be between 4 and 40 characters".into()));
    }
    let username_len = signup.username.chars().count();
    if username_len < 3 || username_len > 15 {
        return Err(Error::InvalidRequest("username must be between 3 and 15 characters".into()));
    }
    if signup.email.trim().is_empty() || !signup.email.contains('@') {
        return Err(Error::InvalidRequest("email is not valid".into()));
    }
    let password_len = signup.password.chars().count();
    if password_len < 6 || password_len > 20 {
        return Err(Error::InvalidRequest("password must be between 6 and 20 characters".into()));
    }
    if UserCommon::username_exists(db, &signup.username).await? {
        return Err(Error::InvalidRequest("username is already taken".into()));
    }
    if UserCommon::email_exists(db, &signup.email).await? {
        return Err(Error::InvalidRequest("email address already in use".into()));
    }
    let slt = random_salt();
    let user = UserInsert {
        username: signup.username,
        email: signup.email,
        name: signup.name,
        password: hash_password(&signup.password, &slt),
        salt: slt,
    };
    UserCommon::insert(db, user).await
}
