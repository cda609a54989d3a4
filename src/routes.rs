use crate::{
    api::{attendance, catalog, department, employee, leave, payroll, payslip, period},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::archive_employee)),
                    ),
            )
            .service(
                web::scope("/departments")
                    .service(
                        web::resource("")
                            .route(web::post().to(department::create_department))
                            .route(web::get().to(department::list_departments)),
                    )
                    .service(
                        web::resource("/positions")
                            .route(web::post().to(department::create_position)),
                    )
                    .service(
                        web::resource("/{id}/positions")
                            .route(web::get().to(department::list_positions)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::record_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/summary/{date}")
                            .route(web::get().to(attendance::daily_summary)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::correct_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::post().to(leave::request_leave))
                            .route(web::get().to(leave::list_leaves)),
                    )
                    .service(web::resource("/types").route(web::get().to(leave::list_leave_types)))
                    .service(
                        web::resource("/credits")
                            .route(web::post().to(leave::grant_leave_credits)),
                    )
                    .service(
                        web::resource("/credits/{id}")
                            .route(web::get().to(leave::get_leave_credits)),
                    )
                    .service(
                        web::resource("/accrual/{id}")
                            .route(web::get().to(leave::accrual_report)),
                    )
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(leave::get_leave))),
            )
            .service(
                web::scope("/payroll")
                    .service(
                        web::resource("/periods")
                            .route(web::post().to(period::create_period))
                            .route(web::get().to(period::list_periods)),
                    )
                    .service(
                        web::resource("/periods/{id}/close")
                            .route(web::put().to(period::close_period)),
                    )
                    .service(
                        web::resource("/process").route(web::post().to(payroll::process_payroll)),
                    )
                    .service(
                        web::resource("/contributions")
                            .route(web::get().to(payroll::contribution_preview)),
                    )
                    .service(
                        web::resource("/period/{id}")
                            .route(web::get().to(payroll::list_payrolls_for_period)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(payroll::approve_payroll)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::delete().to(payroll::delete_draft_payroll)),
                    ),
            )
            .service(
                web::scope("/payslips")
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payslip::generate_payslips)),
                    )
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(payslip::list_payslips_for_employee)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(payslip::approve_payslip)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(payslip::reject_payslip)),
                    )
                    .service(
                        web::resource("/{id}/distribute")
                            .route(web::put().to(payslip::distribute_payslip)),
                    )
                    .service(
                        web::resource("/{id}/claim").route(web::put().to(payslip::claim_payslip)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(payslip::get_payslip))),
            )
            .service(
                web::scope("/catalog")
                    .service(
                        web::resource("/allowances")
                            .route(web::post().to(catalog::create_allowance))
                            .route(web::get().to(catalog::list_allowances)),
                    )
                    .service(
                        web::resource("/allowances/assign")
                            .route(web::post().to(catalog::assign_allowance)),
                    )
                    .service(
                        web::resource("/allowances/employee/{id}")
                            .route(web::get().to(catalog::list_employee_allowances)),
                    )
                    .service(
                        web::resource("/deductions")
                            .route(web::post().to(catalog::create_deduction))
                            .route(web::get().to(catalog::list_deductions)),
                    )
                    .service(
                        web::resource("/deductions/assign")
                            .route(web::post().to(catalog::assign_deduction)),
                    )
                    .service(
                        web::resource("/deductions/employee/{id}")
                            .route(web::get().to(catalog::list_employee_deductions)),
                    ),
            ),
    );
}
