pub(crate) mod oauth_service;
