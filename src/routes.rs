use crate::{
    api::{deduction, employee, employment, message, payslip},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("limiter period and burst are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes. Registered first so they win over the protected prefix scope.
    cfg.service(
        web::scope(&format!("{}/auth", config.api_prefix))
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/code/{code}")
                            .route(web::get().to(employee::get_employee_by_code)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/employments")
                    .service(
                        web::resource("")
                            .route(web::post().to(employment::create_employment))
                            .route(web::get().to(employment::list_employments)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employment::get_employment))
                            .route(web::put().to(employment::update_employment))
                            .route(web::delete().to(employment::delete_employment)),
                    ),
            )
            .service(
                web::scope("/deductions")
                    .service(
                        web::resource("")
                            .route(web::post().to(deduction::create_deduction))
                            .route(web::get().to(deduction::list_deductions)),
                    )
                    // GET and DELETE take the id, PUT takes the code
                    .service(
                        web::resource("/{key}")
                            .route(web::get().to(deduction::get_deduction))
                            .route(web::put().to(deduction::update_deduction))
                            .route(web::delete().to(deduction::delete_deduction)),
                    ),
            )
            .service(
                web::scope("/payslips")
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payslip::generate_payroll)),
                    )
                    .service(
                        web::resource("/approve/{month}/{year}")
                            .route(web::put().to(payslip::approve_payroll)),
                    )
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(payslip::list_employee_payslips)),
                    )
                    .service(
                        web::resource("/month/{month}/year/{year}")
                            .route(web::get().to(payslip::list_period_payslips)),
                    )
                    .service(
                        web::resource("/{id}").route(web::get().to(payslip::get_payslip)),
                    ),
            )
            .service(
                web::scope("/messages")
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(message::list_employee_messages)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(message::get_message))),
            ),
    );
}
