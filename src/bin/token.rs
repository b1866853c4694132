use beam::api::token_handler::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    beam::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
