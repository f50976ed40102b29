pub mod attendance;
pub mod manual_payment;
pub mod payroll;
pub mod reports;

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::body::MessageBody;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::test::TestRequest;
    use actix_web::web::Data;
    use actix_web::{App, http::header};

    use crate::auth::jwt::test_tokens::access_token;
    use crate::config::Config;
    use crate::model::role::Role;
    use crate::routes;
    use crate::service::HrmCore;

    pub fn app(
        core: Data<HrmCore>,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let config = Config::for_tests();
        App::new()
            .app_data(core)
            .app_data(Data::new(config.clone()))
            .configure(move |cfg| routes::configure(cfg, config))
    }

    /// A request from a fixed peer, as the rate limiter keys on the peer IP.
    pub fn request(req: TestRequest, role: Role, employee_id: Option<u64>) -> TestRequest {
        let token = access_token(role, employee_id, &Config::for_tests().jwt_secret);
        req.peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    }

    pub fn admin(req: TestRequest) -> TestRequest {
        request(req, Role::Admin, None)
    }

    pub fn hr(req: TestRequest) -> TestRequest {
        request(req, Role::Hr, None)
    }

    pub fn employee(req: TestRequest, employee_id: u64) -> TestRequest {
        request(req, Role::Employee, Some(employee_id))
    }
}
