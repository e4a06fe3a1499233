use crate::{
    api::{employee, leave, task, work_status},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = limiter(config.rate_login_per_min);
    let register_limiter = limiter(config.rate_register_per_min);
    let refresh_limiter = limiter(config.rate_refresh_per_min);
    let protected_limiter = limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            )
            .service(
                web::resource("/forgot-password")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::forgot_password)),
            )
            .service(
                web::resource("/reset-password")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::reset_password)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave::leave_list))
                            .route(web::post().to(leave::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave::get_leave))
                            .route(web::put().to(leave::update_leave)),
                    )
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)),
                    )
                    // /leave/{id}/split
                    .service(
                        web::resource("/{id}/split").route(web::post().to(leave::split_leave)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    // /tasks
                    .service(
                        web::resource("")
                            .route(web::get().to(task::month_tasks))
                            .route(web::post().to(task::submit_task)),
                    )
                    // /tasks/assign
                    .service(web::resource("/assign").route(web::post().to(task::assign_tasks))),
            )
            .service(
                web::resource("/work-status").route(web::get().to(work_status::work_status)),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(web::resource("").route(web::get().to(employee::list_users)))
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_user))
                            .route(web::put().to(employee::update_user)),
                    ),
            ),
    );
}
