pub mod claims;
pub mod clock;
pub mod exempt;
pub mod gate;
pub mod jwt;

pub use claims::{RequestClaims, TokenClaims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use exempt::ExemptRoutes;
pub use gate::{GateOutcome, Gatekeeper, RouteMatch};
pub use jwt::{mint_access_token, TokenDecoder, TokenRejection};
