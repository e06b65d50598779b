// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payment gateway (PayMongo) configuration
    pub paymongo_secret_key: String,
    pub paymongo_webhook_secret: String,
    // SMS provider configuration
    pub sms_api_key: String,
    pub sms_sender_name: String,
    // Where completion proof images land
    pub upload_dir: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        // Gateway configuration (with test defaults)
        let paymongo_secret_key = std::env::var("PAYMONGO_SECRET_KEY")
            .unwrap_or_else(|_| "sk_test_secret".to_string());
        let paymongo_webhook_secret = std::env::var("PAYMONGO_WEBHOOK_SECRET")
            .unwrap_or_else(|_| "whsk_test_secret".to_string());

        // SMS configuration (with defaults)
        let sms_api_key = std::env::var("SMS_API_KEY")
            .unwrap_or_else(|_| "".to_string());
        let sms_sender_name = std::env::var("SMS_SENDER_NAME")
            .unwrap_or_else(|_| "HanapBuhay".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port: 8000,
            paymongo_secret_key,
            paymongo_webhook_secret,
            sms_api_key,
            sms_sender_name,
            upload_dir,
        }
    }
}
