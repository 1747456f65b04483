pub type Endpoint = str;

/* Relative to `base_url` */
pub const PRODUCTION: &Endpoint = "./production.json";
pub const INVERTERS: &Endpoint = "./api/v1/production/inverters";
