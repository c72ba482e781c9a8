use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        ActiveCompany, ApprovalStatus, CompanyRole, DiscountKind, DiscountStatus, GlobalRole,
        Membership, OrderStage, OrderStatus, StageAction, StageView,
        stage::{ActionKind, StageProgress},
        tenancy::ResolutionSource,
    },
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList},
        companies::{
            AddMemberRequest, ApprovalRequest, CompanyList, CreateCompanyRequest,
            ImpersonateRequest, MemberList, MyCompanies, SelectCompanyRequest, SessionState,
            SetActiveRequest, UserList,
        },
        discounts::{DiscountDecision, DiscountList, RequestDiscountRequest},
        orders::{
            AddOrderItemRequest, AdvanceStageRequest, CheckoutRequest, OrderItemWithDiscounts,
            OrderList, OrderWithItems, StageAdvanced, UpdateFreightRequest,
            UpdateOrderItemRequest, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{
        CartItem, Company, CompanyMember, CompanyMembership, Order, OrderItem, OrderItemDiscount,
        Product, User,
    },
    printing::PrintedDocument,
    response::{ApiResponse, Empty, Meta},
    routes::{
        admin, auth, cart, company, discounts, health, me, orders, products as product_routes,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        me::my_companies,
        me::current_session,
        me::select_active_company,
        me::clear_active_company,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::add_item,
        orders::update_item,
        orders::remove_item,
        orders::request_discount,
        orders::list_order_discounts,
        orders::advance_stage,
        orders::update_status,
        orders::cancel_order,
        orders::update_freight,
        orders::recalculate,
        discounts::list_discounts,
        discounts::approve_discount,
        discounts::reject_discount,
        company::list_members,
        company::add_member,
        company::remove_member,
        admin::list_companies,
        admin::create_company,
        admin::decide_company,
        admin::set_company_active,
        admin::list_users,
        admin::decide_user,
        admin::enter_impersonation,
        admin::exit_impersonation
    ),
    components(
        schemas(
            User,
            Company,
            CompanyMembership,
            CompanyMember,
            Product,
            CartItem,
            Order,
            OrderItem,
            OrderItemDiscount,
            OrderStatus,
            OrderStage,
            StageView,
            StageAction,
            StageProgress,
            ActionKind,
            DiscountKind,
            DiscountStatus,
            ApprovalStatus,
            CompanyRole,
            GlobalRole,
            Membership,
            ActiveCompany,
            ResolutionSource,
            PrintedDocument,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CartItemDto,
            CartList,
            SelectCompanyRequest,
            ImpersonateRequest,
            SessionState,
            MyCompanies,
            CreateCompanyRequest,
            ApprovalRequest,
            SetActiveRequest,
            CompanyList,
            UserList,
            AddMemberRequest,
            MemberList,
            RequestDiscountRequest,
            DiscountList,
            DiscountDecision,
            CheckoutRequest,
            AddOrderItemRequest,
            UpdateOrderItemRequest,
            UpdateFreightRequest,
            AdvanceStageRequest,
            UpdateOrderStatusRequest,
            OrderItemWithDiscounts,
            OrderWithItems,
            OrderList,
            StageAdvanced,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            Meta,
            Empty,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<SessionState>,
            ApiResponse<Empty>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and sessions"),
        (name = "Me", description = "Company memberships and active company selection"),
        (name = "Products", description = "Per-company catalog"),
        (name = "Cart", description = "Cart in the active company"),
        (name = "Orders", description = "Quotes, items, fulfillment stages"),
        (name = "Discounts", description = "Line discount requests and approvals"),
        (name = "Company", description = "Company member management"),
        (name = "Admin", description = "Superadmin console and impersonation"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
