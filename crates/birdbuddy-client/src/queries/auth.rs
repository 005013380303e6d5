//! Authentication operations.

use birdbuddy_core::Operation;

use super::{feeder_member_fields, feeder_owner_fields, me_fields};

pub const SIGN_IN: Operation = Operation::new(
    "emailSignIn",
    "authEmailSignIn",
    concat!(
        r#"mutation emailSignIn($emailSignInInput: EmailSignInInput!) {
  authEmailSignIn(emailSignInInput: $emailSignInInput) {
    ... on Auth {
      ...AuthFields
      me {
        ...MeFields
        __typename
      }
      __typename
    }
    ... on Problem {
      items {
        field
        kind
        __typename
      }
      __typename
    }
    __typename
  }
}
fragment AuthFields on Auth {
  accessToken
  refreshToken
  __typename
}"#,
        me_fields!(),
        feeder_owner_fields!(),
        feeder_member_fields!()
    ),
)
.sensitive();

pub const REFRESH_AUTH_TOKEN: Operation = Operation::new(
    "authRefreshToken",
    "authRefreshToken",
    r#"mutation authRefreshToken($refreshTokenInput: RefreshTokenInput!) {
  authRefreshToken(refreshTokenInput: $refreshTokenInput) {
    ...AuthFields
    __typename
  }
}
fragment AuthFields on Auth {
  accessToken
  refreshToken
  __typename
}"#,
)
.sensitive();
