#[actix_web::main]
async fn main() -> Result<(), sheetsense_lib::AppError> {
    sheetsense_lib::run().await
}
