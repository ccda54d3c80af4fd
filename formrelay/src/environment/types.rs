use formrelay_core_contact_impl::ContactServiceImpl;
use formrelay_email_impl::EmailServiceImpl;
use formrelay_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};

// API
pub type RestServer = formrelay_api_rest::RestServer<Contact, RateLimit>;

// Core
pub type Contact = ContactServiceImpl<Email, Time>;

// Email
pub type Email = EmailServiceImpl;

// Shared
pub type RateLimit = RateLimitServiceImpl<Time>;
pub type Time = TimeServiceImpl;
